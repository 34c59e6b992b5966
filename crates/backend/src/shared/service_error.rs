use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Error returned by domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs the failure of `action` and returns the matching status code
    pub fn into_status(self, action: &str) -> StatusCode {
        match &self {
            ServiceError::Storage(e) => tracing::error!("Failed to {}: {:#}", action, e),
            ServiceError::Validation(msg) => tracing::warn!("Rejected {}: {}", action, msg),
            ServiceError::NotFound => {}
        }
        self.status_code()
    }

    /// Like [`ServiceError::into_status`], with `{"error": ...}` as the body.
    /// Storage details stay in the log.
    pub fn into_body(self, action: &str) -> (StatusCode, Json<serde_json::Value>) {
        let message = match &self {
            ServiceError::Storage(_) => "Internal error".to_string(),
            other => other.to_string(),
        };
        (self.into_status(action), Json(json!({ "error": message })))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

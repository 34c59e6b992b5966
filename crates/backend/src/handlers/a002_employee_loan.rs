use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a002_employee_loan::{EmployeeLoan, EmployeeLoanDto, LoanListResponse};
use contracts::shared::record_filter::FilterCriteria;
use serde::Deserialize;
use serde_json::json;

use crate::domain::a002_employee_loan;
use crate::shared::context::AppContext;
use crate::system::branch_context::SelectedBranchesHeader;

/// GET /api/employee_loan
pub async fn list_all(State(ctx): State<AppContext>) -> Result<Json<Vec<EmployeeLoan>>, StatusCode> {
    a002_employee_loan::service::list_all(&ctx)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list employee loans"))
}

/// GET /api/employee_loan/list
pub async fn list_filtered(
    State(ctx): State<AppContext>,
    SelectedBranchesHeader(selected): SelectedBranchesHeader,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<LoanListResponse>, StatusCode> {
    a002_employee_loan::service::list_view(&ctx, &criteria, &selected)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list employee loan view"))
}

/// GET /api/employee_loan/:id
pub async fn get_by_id(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<EmployeeLoan>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a002_employee_loan::service::get_by_id(&ctx, uuid)
        .await
        .map(Json)
        .map_err(|e| e.into_status("get employee loan"))
}

/// POST /api/employee_loan
pub async fn upsert(
    State(ctx): State<AppContext>,
    Json(dto): Json<EmployeeLoanDto>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let result = match dto.id.clone() {
        Some(id) => a002_employee_loan::service::update(&ctx, dto).await.map(|_| id),
        None => a002_employee_loan::service::create(&ctx, dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(e.into_body("save employee loan")),
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
}

/// POST /api/employee_loan/:id/payment
pub async fn record_payment(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<EmployeeLoan>, (StatusCode, Json<serde_json::Value>)> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid ID" }))))?;
    a002_employee_loan::service::record_payment(&ctx, uuid, req.amount)
        .await
        .map(Json)
        .map_err(|e| e.into_body("record loan payment"))
}

/// DELETE /api/employee_loan/:id
pub async fn delete(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a002_employee_loan::service::delete(&ctx, uuid)
        .await
        .map_err(|e| e.into_status("delete employee loan"))
}

/// POST /api/employee_loan/testdata
pub async fn insert_test_data(State(ctx): State<AppContext>) -> StatusCode {
    match a002_employee_loan::service::insert_test_data(&ctx).await {
        Ok(_) => StatusCode::OK,
        Err(e) => e.into_status("insert employee loan test data"),
    }
}

use axum::body::to_bytes;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;
use contracts::shared::branch_scope::{BranchRef, SelectedBranches};

use crate::shared::format::format_number;
use crate::system::branch_context::SELECTED_BRANCHES_HEADER;

/// Cyan for success, yellow for everything else
fn status_color(status: StatusCode) -> &'static str {
    if status.is_success() {
        "36"
    } else {
        "33"
    }
}

/// Normalized branch list for the log line; empty when every branch is selected
fn describe_selection(raw: &str) -> String {
    let selected = SelectedBranches::parse_list(raw);
    if selected.is_empty() {
        return String::new();
    }
    let ids: Vec<&str> = selected.iter().map(BranchRef::as_str).collect();
    format!(" [branches: {}]", ids.join(","))
}

/// Request logging middleware.
///
/// Prints one line per request:
/// - local time
/// - duration (ms)
/// - response size (formatted)
/// - status code
/// - method and path
/// - branch selection, when the caller sent one
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let branches = req
        .headers()
        .get(SELECTED_BRANCHES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(describe_selection)
        .unwrap_or_default();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // The body is buffered to report its real size
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("Failed to buffer response for {} {}: {}", method, uri.path(), e);
            println!(
                "\x1b[33m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}{}",
                Local::now().format("%H:%M:%S"),
                start.elapsed().as_millis(),
                "error",
                parts.status.as_u16(),
                method,
                uri.path(),
                branches
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}{}",
        status_color(parts.status),
        Local::now().format("%H:%M:%S"),
        start.elapsed().as_millis(),
        format_number(bytes.len()),
        parts.status.as_u16(),
        method,
        uri.path(),
        branches
    );

    Response::from_parts(parts, Body::from(bytes))
}

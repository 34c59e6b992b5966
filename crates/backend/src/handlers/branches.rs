use axum::{extract::State, Json};
use contracts::shared::branch_scope::BranchInfo;

use crate::shared::context::AppContext;

/// GET /api/branches
pub async fn list_all(State(ctx): State<AppContext>) -> Json<Vec<BranchInfo>> {
    Json(ctx.branches.branches().to_vec())
}

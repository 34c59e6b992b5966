use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use contracts::dashboards::d400_branch_summary::{BranchSummaryRequest, BranchSummaryResponse};

use crate::dashboards::d400_branch_summary::service;
use crate::shared::context::AppContext;
use crate::system::branch_context::SelectedBranchesHeader;

/// GET /api/d400/branch_summary
pub async fn get_branch_summary(
    State(ctx): State<AppContext>,
    SelectedBranchesHeader(selected): SelectedBranchesHeader,
    Query(request): Query<BranchSummaryRequest>,
) -> Result<Json<BranchSummaryResponse>, StatusCode> {
    service::get_branch_summary(&ctx, request, &selected)
        .await
        .map(Json)
        .map_err(|e| e.into_status("build branch summary"))
}

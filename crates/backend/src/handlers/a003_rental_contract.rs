use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_rental_contract::{
    ContractListResponse, RentalContract, RentalContractDto,
};
use contracts::shared::record_filter::FilterCriteria;
use serde_json::json;

use crate::domain::a003_rental_contract;
use crate::shared::context::AppContext;
use crate::system::branch_context::SelectedBranchesHeader;

/// GET /api/rental_contract
pub async fn list_all(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<RentalContract>>, StatusCode> {
    a003_rental_contract::service::list_all(&ctx)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list rental contracts"))
}

/// GET /api/rental_contract/list
pub async fn list_filtered(
    State(ctx): State<AppContext>,
    SelectedBranchesHeader(selected): SelectedBranchesHeader,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<ContractListResponse>, StatusCode> {
    a003_rental_contract::service::list_view(&ctx, &criteria, &selected)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list rental contract view"))
}

/// GET /api/rental_contract/:id
pub async fn get_by_id(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<RentalContract>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a003_rental_contract::service::get_by_id(&ctx, uuid)
        .await
        .map(Json)
        .map_err(|e| e.into_status("get rental contract"))
}

/// POST /api/rental_contract
pub async fn upsert(
    State(ctx): State<AppContext>,
    Json(dto): Json<RentalContractDto>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let result = match dto.id.clone() {
        Some(id) => a003_rental_contract::service::update(&ctx, dto).await.map(|_| id),
        None => a003_rental_contract::service::create(&ctx, dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(e.into_body("save rental contract")),
    }
}

/// POST /api/rental_contract/:id/terminate
pub async fn terminate(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<RentalContract>, (StatusCode, Json<serde_json::Value>)> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid ID" }))))?;
    a003_rental_contract::service::terminate(&ctx, uuid)
        .await
        .map(Json)
        .map_err(|e| e.into_body("terminate rental contract"))
}

/// DELETE /api/rental_contract/:id
pub async fn delete(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a003_rental_contract::service::delete(&ctx, uuid)
        .await
        .map_err(|e| e.into_status("delete rental contract"))
}

/// POST /api/rental_contract/testdata
pub async fn insert_test_data(State(ctx): State<AppContext>) -> StatusCode {
    match a003_rental_contract::service::insert_test_data(&ctx).await {
        Ok(_) => StatusCode::OK,
        Err(e) => e.into_status("insert rental contract test data"),
    }
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a004_fuel_sale::{FuelSale, FuelSaleDto, FuelSaleListResponse};
use contracts::shared::record_filter::FilterCriteria;
use serde_json::json;

use crate::domain::a004_fuel_sale;
use crate::shared::context::AppContext;
use crate::system::branch_context::SelectedBranchesHeader;

/// GET /api/fuel_sale
pub async fn list_all(State(ctx): State<AppContext>) -> Result<Json<Vec<FuelSale>>, StatusCode> {
    a004_fuel_sale::service::list_all(&ctx)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list fuel sales"))
}

/// GET /api/fuel_sale/list
pub async fn list_filtered(
    State(ctx): State<AppContext>,
    SelectedBranchesHeader(selected): SelectedBranchesHeader,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<FuelSaleListResponse>, StatusCode> {
    a004_fuel_sale::service::list_view(&ctx, &criteria, &selected)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list fuel sale view"))
}

/// GET /api/fuel_sale/:id
pub async fn get_by_id(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<FuelSale>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a004_fuel_sale::service::get_by_id(&ctx, uuid)
        .await
        .map(Json)
        .map_err(|e| e.into_status("get fuel sale"))
}

/// POST /api/fuel_sale
pub async fn upsert(
    State(ctx): State<AppContext>,
    Json(dto): Json<FuelSaleDto>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let result = match dto.id.clone() {
        Some(id) => a004_fuel_sale::service::update(&ctx, dto).await.map(|_| id),
        None => a004_fuel_sale::service::create(&ctx, dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(e.into_body("save fuel sale")),
    }
}

/// DELETE /api/fuel_sale/:id
pub async fn delete(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a004_fuel_sale::service::delete(&ctx, uuid)
        .await
        .map_err(|e| e.into_status("delete fuel sale"))
}

/// POST /api/fuel_sale/testdata
pub async fn insert_test_data(State(ctx): State<AppContext>) -> StatusCode {
    match a004_fuel_sale::service::insert_test_data(&ctx).await {
        Ok(_) => StatusCode::OK,
        Err(e) => e.into_status("insert fuel sale test data"),
    }
}

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use contracts::domain::a001_stock_item::{StockItem, StockItemDto, StockListResponse};
use contracts::shared::record_filter::FilterCriteria;
use serde::Deserialize;
use serde_json::json;

use crate::domain::a001_stock_item;
use crate::shared::context::AppContext;
use crate::system::branch_context::SelectedBranchesHeader;

type ErrorBody = (StatusCode, Json<serde_json::Value>);

/// GET /api/stock_item
pub async fn list_all(State(ctx): State<AppContext>) -> Result<Json<Vec<StockItem>>, StatusCode> {
    a001_stock_item::service::list_all(&ctx)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list stock items"))
}

/// GET /api/stock_item/list
pub async fn list_filtered(
    State(ctx): State<AppContext>,
    SelectedBranchesHeader(selected): SelectedBranchesHeader,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<StockListResponse>, StatusCode> {
    a001_stock_item::service::list_view(&ctx, &criteria, &selected)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list stock view"))
}

/// GET /api/stock_item/alerts
pub async fn alerts(
    State(ctx): State<AppContext>,
    SelectedBranchesHeader(selected): SelectedBranchesHeader,
    Query(criteria): Query<FilterCriteria>,
) -> Result<Json<StockListResponse>, StatusCode> {
    a001_stock_item::service::alerts(&ctx, &criteria, &selected)
        .await
        .map(Json)
        .map_err(|e| e.into_status("list stock alerts"))
}

/// GET /api/stock_item/export
pub async fn export_csv(
    State(ctx): State<AppContext>,
    SelectedBranchesHeader(selected): SelectedBranchesHeader,
    Query(criteria): Query<FilterCriteria>,
) -> Result<impl IntoResponse, StatusCode> {
    let csv = a001_stock_item::service::export_csv(&ctx, &criteria, &selected)
        .await
        .map_err(|e| e.into_status("export stock"))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"stock.csv\"",
            ),
        ],
        csv,
    ))
}

/// GET /api/stock_item/:id
pub async fn get_by_id(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<StockItem>, StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a001_stock_item::service::get_by_id(&ctx, uuid)
        .await
        .map(Json)
        .map_err(|e| e.into_status("get stock item"))
}

/// POST /api/stock_item
pub async fn upsert(
    State(ctx): State<AppContext>,
    Json(dto): Json<StockItemDto>,
) -> Result<Json<serde_json::Value>, ErrorBody> {
    let result = match dto.id.clone() {
        Some(id) => a001_stock_item::service::update(&ctx, dto).await.map(|_| id),
        None => a001_stock_item::service::create(&ctx, dto)
            .await
            .map(|id| id.to_string()),
    };

    match result {
        Ok(id) => Ok(Json(json!({ "id": id }))),
        Err(e) => Err(e.into_body("save stock item")),
    }
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub delta: f64,
}

/// POST /api/stock_item/:id/adjust
pub async fn adjust(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<StockItem>, ErrorBody> {
    let uuid = uuid::Uuid::parse_str(&id)
        .map_err(|_| (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid ID" }))))?;
    a001_stock_item::service::adjust_quantity(&ctx, uuid, req.delta)
        .await
        .map(Json)
        .map_err(|e| e.into_body("adjust stock"))
}

/// DELETE /api/stock_item/:id
pub async fn delete(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<(), StatusCode> {
    let uuid = uuid::Uuid::parse_str(&id).map_err(|_| StatusCode::BAD_REQUEST)?;
    a001_stock_item::service::delete(&ctx, uuid)
        .await
        .map_err(|e| e.into_status("delete stock item"))
}

/// POST /api/stock_item/testdata
pub async fn insert_test_data(State(ctx): State<AppContext>) -> StatusCode {
    match a001_stock_item::service::insert_test_data(&ctx).await {
        Ok(_) => StatusCode::OK,
        Err(e) => e.into_status("insert stock test data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::parse_config;
    use crate::shared::data::db::connect_in_memory;
    use axum::http::Uri;
    use contracts::shared::branch_scope::{BranchRef, SelectedBranches};
    use contracts::shared::stock_status::StockTier;

    fn query(uri: &str) -> Result<FilterCriteria, String> {
        let uri: Uri = uri.parse().map_err(|e| format!("{e}"))?;
        Query::<FilterCriteria>::try_from_uri(&uri)
            .map(|Query(c)| c)
            .map_err(|e| e.body_text())
    }

    async fn context() -> AppContext {
        let config = parse_config(
            r#"
[database]
path = "unused.db"

[[branches]]
id = 1
name = "Bang Na"

[[branches]]
id = 2
name = "Rangsit"

[[branches]]
id = 3
name = "Korat"

[stock_status.shops.quick_service]
critical_percent = 15.0
warning_percent = 50.0
"#,
        )
        .unwrap();
        let db = connect_in_memory().await.unwrap();
        let ctx = AppContext::from_config(&config, db).unwrap();
        a001_stock_item::service::insert_test_data(&ctx).await.unwrap();
        ctx
    }

    #[test]
    fn test_blank_query_parameters_mean_no_filter() {
        let criteria = query("/api/stock_item/list?branch=&sort_by=&category=&search=").unwrap();
        assert_eq!(criteria.branch, None);
        assert_eq!(criteria.sort_by, None);
        assert_eq!(criteria.sort_field(), None);
        assert_eq!(
            criteria.effective_scope(&SelectedBranches::parse_list("2")),
            SelectedBranches::parse_list("2")
        );
    }

    #[test]
    fn test_query_parameters_are_normalized() {
        let criteria =
            query("/api/stock_item/list?branch=01&sort_by=quantity&sort_desc=true&date_from=2025-03-02")
                .unwrap();
        assert_eq!(criteria.branch, Some(BranchRef::from_number(1)));
        assert_eq!(criteria.sort_field(), Some("quantity"));
        assert!(criteria.sort_desc);
        assert_eq!(criteria.date_from, chrono::NaiveDate::from_ymd_opt(2025, 3, 2));
        assert_eq!(criteria.date_to, None);
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        assert!(query("/api/stock_item/list?date_from=yesterday").is_err());
    }

    #[tokio::test]
    async fn test_alerts_handler_with_blank_sort() {
        let ctx = context().await;
        let criteria = query("/api/stock_item/alerts?branch=1&sort_by=").unwrap();
        let Json(resp) = alerts(
            State(ctx),
            SelectedBranchesHeader(SelectedBranches::all()),
            Query(criteria),
        )
        .await
        .unwrap();
        assert_eq!(resp.total_count, 3);
        assert_eq!(resp.items[0].tier(), Some(StockTier::Critical));
    }

    #[tokio::test]
    async fn test_list_handler_rejects_unknown_status() {
        let ctx = context().await;
        let criteria = query("/api/stock_item/list?status=low").unwrap();
        let result = list_filtered(
            State(ctx),
            SelectedBranchesHeader(SelectedBranches::all()),
            Query(criteria),
        )
        .await;
        assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_handler_scopes_by_header() {
        let ctx = context().await;
        let Json(resp) = list_filtered(
            State(ctx),
            SelectedBranchesHeader(SelectedBranches::parse_list("3")),
            Query(query("/api/stock_item/list").unwrap()),
        )
        .await
        .unwrap();
        assert_eq!(resp.total_count, 1);
        assert_eq!(resp.items[0].name, "Drinking water 600ml");
    }
}

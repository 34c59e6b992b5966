use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::shared::context::AppContext;

/// All application routes
pub fn configure_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/branches", get(handlers::branches::list_all))
        // A001 Stock item handlers
        .route(
            "/api/stock_item",
            get(handlers::a001_stock_item::list_all).post(handlers::a001_stock_item::upsert),
        )
        .route(
            "/api/stock_item/list",
            get(handlers::a001_stock_item::list_filtered),
        )
        .route(
            "/api/stock_item/alerts",
            get(handlers::a001_stock_item::alerts),
        )
        .route(
            "/api/stock_item/export",
            get(handlers::a001_stock_item::export_csv),
        )
        .route(
            "/api/stock_item/:id",
            get(handlers::a001_stock_item::get_by_id).delete(handlers::a001_stock_item::delete),
        )
        .route(
            "/api/stock_item/:id/adjust",
            post(handlers::a001_stock_item::adjust),
        )
        .route(
            "/api/stock_item/testdata",
            post(handlers::a001_stock_item::insert_test_data),
        )
        // A002 Employee loan handlers
        .route(
            "/api/employee_loan",
            get(handlers::a002_employee_loan::list_all)
                .post(handlers::a002_employee_loan::upsert),
        )
        .route(
            "/api/employee_loan/list",
            get(handlers::a002_employee_loan::list_filtered),
        )
        .route(
            "/api/employee_loan/:id",
            get(handlers::a002_employee_loan::get_by_id)
                .delete(handlers::a002_employee_loan::delete),
        )
        .route(
            "/api/employee_loan/:id/payment",
            post(handlers::a002_employee_loan::record_payment),
        )
        .route(
            "/api/employee_loan/testdata",
            post(handlers::a002_employee_loan::insert_test_data),
        )
        // A003 Rental contract handlers
        .route(
            "/api/rental_contract",
            get(handlers::a003_rental_contract::list_all)
                .post(handlers::a003_rental_contract::upsert),
        )
        .route(
            "/api/rental_contract/list",
            get(handlers::a003_rental_contract::list_filtered),
        )
        .route(
            "/api/rental_contract/:id",
            get(handlers::a003_rental_contract::get_by_id)
                .delete(handlers::a003_rental_contract::delete),
        )
        .route(
            "/api/rental_contract/:id/terminate",
            post(handlers::a003_rental_contract::terminate),
        )
        .route(
            "/api/rental_contract/testdata",
            post(handlers::a003_rental_contract::insert_test_data),
        )
        // A004 Fuel sale handlers
        .route(
            "/api/fuel_sale",
            get(handlers::a004_fuel_sale::list_all).post(handlers::a004_fuel_sale::upsert),
        )
        .route(
            "/api/fuel_sale/list",
            get(handlers::a004_fuel_sale::list_filtered),
        )
        .route(
            "/api/fuel_sale/:id",
            get(handlers::a004_fuel_sale::get_by_id).delete(handlers::a004_fuel_sale::delete),
        )
        .route(
            "/api/fuel_sale/testdata",
            post(handlers::a004_fuel_sale::insert_test_data),
        )
        // D400 Branch summary dashboard
        .route(
            "/api/d400/branch_summary",
            get(handlers::d400_branch_summary::get_branch_summary),
        )
}

use std::net::SocketAddr;

use axum::http::{header, HeaderName, Method};
use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use backend::routes::configure_routes;
use backend::shared::config::{get_database_path, load_config};
use backend::shared::context::AppContext;
use backend::shared::data::db::initialize_database;
use backend::system;
use backend::system::branch_context::SELECTED_BRANCHES_HEADER;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = load_config()?;
    let db_path = get_database_path(&config);
    let db = initialize_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;
    let ctx = AppContext::from_config(&config, db)?;
    tracing::info!(
        "{} branches registered, stock policy {}%/{}%",
        ctx.branches.branches().len(),
        ctx.stock_policies.default.critical_percent,
        ctx.stock_policies.default.warning_percent
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-selected-branches"),
        ])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let app = configure_routes()
        .layer(cors)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .with_state(ctx);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(
        "Backend listening on http://{} (branch context header: {})",
        addr,
        SELECTED_BRANCHES_HEADER
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

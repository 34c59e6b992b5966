use std::sync::Arc;

use chrono::NaiveDate;
use contracts::shared::branch_scope::BranchRegistry;
use contracts::shared::stock_status::StockPolicies;
use sea_orm::DatabaseConnection;

use super::config::{Config, RentalConfig};

/// Everything a request needs, handed to handlers as axum state
#[derive(Clone)]
pub struct AppContext {
    pub db: DatabaseConnection,
    pub branches: Arc<BranchRegistry>,
    pub stock_policies: Arc<StockPolicies>,
    pub rental: RentalConfig,
}

impl AppContext {
    pub fn from_config(config: &Config, db: DatabaseConnection) -> anyhow::Result<Self> {
        Ok(Self {
            db,
            branches: Arc::new(config.branch_registry()?),
            stock_policies: Arc::new(config.stock_status.clone()),
            rental: config.rental.clone(),
        })
    }

    /// Business date used for expiry and contract checks
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::a004_fuel_sale::FuelTotals;
use crate::shared::branch_scope::BranchRef;
use crate::shared::stock_status::TierCounts;

/// Request for the branch summary dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchSummaryRequest {
    /// First day of the sales period, inclusive
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    /// Last day of the sales period, inclusive
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

/// One row per branch in scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchSummaryRow {
    pub branch_id: Option<BranchRef>,
    /// Display name; "Total" for the totals row
    pub branch_name: String,
    pub fuel: FuelTotals,
    pub stock: TierCounts,
    /// Monthly rent of contracts in force today
    pub rent_in_force: f64,
    pub loans_outstanding: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSummaryResponse {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub rows: Vec<BranchSummaryRow>,
    pub totals: BranchSummaryRow,
}

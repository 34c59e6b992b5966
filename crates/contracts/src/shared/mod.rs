pub mod branch_scope;
pub mod record_filter;
pub mod stock_status;

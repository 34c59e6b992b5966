pub mod config;
pub mod context;
pub mod data;
pub mod format;
pub mod service_error;

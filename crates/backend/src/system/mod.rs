pub mod branch_context;
pub mod middleware;
pub mod tracing;

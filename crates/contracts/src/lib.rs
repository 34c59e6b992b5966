//! Shared types for the fuel-station back office.
//!
//! Everything here is free of I/O: aggregates and DTOs exchanged over the
//! API, plus the list logic every view relies on (stock tiers, branch
//! scoping, record filtering).

pub mod dashboards;
pub mod domain;
pub mod enums;
pub mod shared;

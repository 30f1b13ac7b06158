//! Services Layer
//!
//! Domain logic extracted from HTTP handlers: product defaulting, order
//! pricing, commission accrual and the reporting aggregations.

pub mod analytics;
pub mod catalog;
pub mod commission;
pub mod orders;

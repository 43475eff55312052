//! Core domain types and logic.

pub mod dates;
pub mod trade;
pub mod window;
pub mod aggregation;
pub mod cache;
pub mod store;
pub mod journal;
pub mod config_validation;
pub mod error;

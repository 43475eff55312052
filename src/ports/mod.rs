//! Port traits the domain depends on.

pub mod blob_port;
pub mod clock_port;
pub mod config_port;

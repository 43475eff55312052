//! Concrete adapter implementations for ports.

#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
pub mod csv_adapter;
pub mod file_blob_adapter;
pub mod file_config_adapter;
pub mod memory_blob_adapter;
pub mod system_clock;

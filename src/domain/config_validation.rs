//! Configuration validation.
//!
//! Checks the `[storage]`, `[journal]` and `[logging]` sections before the
//! journal is opened. Every key is optional; only present values are checked,
//! except that disk-backed storage needs a path.

use crate::domain::error::JournalError;
use crate::ports::config_port::ConfigPort;

pub const STORAGE_BACKENDS: &[&str] = &["file", "sqlite", "memory"];
pub const LOG_FORMATS: &[&str] = &["pretty", "json"];

pub fn validate_journal_config(config: &dyn ConfigPort) -> Result<(), JournalError> {
    validate_backend(config)?;
    validate_storage_key(config)?;
    validate_default_asset(config)?;
    validate_log_format(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: String) -> JournalError {
    JournalError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

fn validate_backend(config: &dyn ConfigPort) -> Result<(), JournalError> {
    let backend = config
        .get_string("storage", "backend")
        .unwrap_or_else(|| "file".to_string());
    if !STORAGE_BACKENDS.contains(&backend.as_str()) {
        return Err(invalid(
            "storage",
            "backend",
            format!("backend must be one of {}", STORAGE_BACKENDS.join(", ")),
        ));
    }

    if backend == "sqlite" {
        match config.get_string("storage", "path") {
            Some(p) if !p.trim().is_empty() => {}
            _ => {
                return Err(JournalError::ConfigMissing {
                    section: "storage".to_string(),
                    key: "path".to_string(),
                });
            }
        }
    }

    if config
        .get_string("storage", "path")
        .is_some_and(|p| p.trim().is_empty())
    {
        return Err(invalid("storage", "path", "path must not be blank".to_string()));
    }

    let pool_size = config.get_int("storage", "pool_size", 2);
    if pool_size < 1 {
        return Err(invalid(
            "storage",
            "pool_size",
            "pool_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_storage_key(config: &dyn ConfigPort) -> Result<(), JournalError> {
    let Some(key) = config.get_string("storage", "key") else {
        return Ok(());
    };
    let usable = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !usable {
        return Err(invalid(
            "storage",
            "key",
            "key must be non-empty and use only letters, digits, '_' or '-'".to_string(),
        ));
    }
    Ok(())
}

fn validate_default_asset(config: &dyn ConfigPort) -> Result<(), JournalError> {
    match config.get_string("journal", "default_asset") {
        Some(asset) if asset.trim().is_empty() => Err(invalid(
            "journal",
            "default_asset",
            "default_asset must not be blank".to_string(),
        )),
        _ => Ok(()),
    }
}

fn validate_log_format(config: &dyn ConfigPort) -> Result<(), JournalError> {
    match config.get_string("logging", "format") {
        Some(format) if !LOG_FORMATS.contains(&format.as_str()) => Err(invalid(
            "logging",
            "format",
            format!("format must be one of {}", LOG_FORMATS.join(", ")),
        )),
        _ => Ok(()),
    }
}

//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for tradejournal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("invalid date {input:?}: {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid window {spec:?}: {reason}")]
    InvalidWindow { spec: String, reason: String },

    #[error("invalid trade {field}: {reason}")]
    InvalidTrade { field: String, reason: String },

    #[error("trade {id} already exists")]
    DuplicateTrade { id: i64 },

    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl JournalError {
    pub(crate) fn invalid_date(input: &str, reason: impl Into<String>) -> Self {
        JournalError::InvalidDate {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn storage(reason: impl std::fmt::Display) -> Self {
        JournalError::StorageUnavailable {
            reason: reason.to_string(),
        }
    }
}

impl From<&JournalError> for std::process::ExitCode {
    fn from(err: &JournalError) -> Self {
        let code: u8 = match err {
            JournalError::Io(_) => 1,
            JournalError::ConfigParse { .. }
            | JournalError::ConfigMissing { .. }
            | JournalError::ConfigInvalid { .. } => 2,
            JournalError::StorageUnavailable { .. } | JournalError::MalformedPayload { .. } => 3,
            JournalError::InvalidDate { .. }
            | JournalError::InvalidRange { .. }
            | JournalError::InvalidWindow { .. }
            | JournalError::InvalidTrade { .. }
            | JournalError::DuplicateTrade { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

//! Durable key-value blob storage port.

use crate::domain::error::JournalError;

/// Opaque string storage keyed by name. `get` of an unknown key is `Ok(None)`.
pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError>;
    fn set(&self, key: &str, value: &str) -> Result<(), JournalError>;
    fn remove(&self, key: &str) -> Result<(), JournalError>;
}

impl<B: BlobStore + ?Sized> BlobStore for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), JournalError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), JournalError> {
        (**self).remove(key)
    }
}

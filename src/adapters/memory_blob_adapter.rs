//! In-process blob store.

use crate::domain::error::JournalError;
use crate::ports::blob_port::BlobStore;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Clones share the same entries, so a caller can keep a handle for
/// inspection after handing the store to the journal.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), JournalError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), JournalError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

//! Store error type shared by every registry trait.

use parking_lot::RwLock;
use thiserror::Error;

/// Errors from a store backend.
///
/// A lookup that finds nothing is `Ok(None)`, not an error. `NotFound` is
/// reserved for operations that require an existing record (delete).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The write would break a uniqueness constraint of the store.
    #[error("{entity} conflict: {reason}")]
    Conflict { entity: &'static str, reason: String },

    /// The backend itself failed (connection, I/O, serialization).
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Simulated backend outage for in-memory stores.
///
/// While set, every store operation fails with [`StoreError::Backend`].
#[derive(Debug, Default)]
pub(crate) struct Outage(RwLock<Option<String>>);

impl Outage {
    pub(crate) fn set(&self, message: Option<String>) {
        *self.0.write() = message;
    }

    pub(crate) fn check(&self) -> Result<(), StoreError> {
        match self.0.read().as_ref() {
            Some(msg) => Err(StoreError::Backend(msg.clone())),
            None => Ok(()),
        }
    }
}

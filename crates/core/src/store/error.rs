use std::error::Error as StdError;

use thiserror::Error;

use crate::events::Event;

/// A fault raised by the backing store, carried opaque and unchanged.
pub type StoreFault = Box<dyn StdError + Send + Sync + 'static>;

/// Result type for backing store calls.
pub type StoreResult<T> = std::result::Result<T, StoreFault>;

/// Errors that can occur during accessor operations.
#[derive(Debug, Error)]
pub enum AccessorError {
    /// `update` was given nothing to write; no request was sent.
    #[error("Update requires at least one attribute")]
    EmptyUpdate,
    /// The store accepted an update but sent back no record.
    #[error("Update returned no attributes")]
    MissingAttributes,
    /// The backing store rejected the request.
    #[error("{event} failed: {source}")]
    Store {
        event: Event,
        #[source]
        source: StoreFault,
    },
}

impl AccessorError {
    pub fn store(event: Event, source: StoreFault) -> Self {
        AccessorError::Store { event, source }
    }

    /// The store fault, if this error came from the backing store.
    pub fn store_fault(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            AccessorError::Store { source, .. } => Some(source.as_ref()),
            AccessorError::EmptyUpdate | AccessorError::MissingAttributes => None,
        }
    }

    pub fn into_store_fault(self) -> Option<StoreFault> {
        match self {
            AccessorError::Store { source, .. } => Some(source),
            AccessorError::EmptyUpdate | AccessorError::MissingAttributes => None,
        }
    }
}

/// Result type for accessor operations.
pub type Result<T> = std::result::Result<T, AccessorError>;

use thiserror::Error;

use crate::domain::DomainError;
use crate::storage::StorageError;

/// Engine-level errors for account and transaction processing
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl EngineError {
    /// The business-rule failure, if this is one
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Storage(_) => None,
        }
    }
}

// Store-level misses and conflicts are business outcomes at this layer
impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => Self::Domain(DomainError::AccountNotFound),
            StorageError::DuplicateKey(_) => Self::Domain(DomainError::DuplicateCard),
            StorageError::DomainError(e) => Self::Domain(e),
            other => Self::Storage(other),
        }
    }
}

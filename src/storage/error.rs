use std::io;
use thiserror::Error;

use crate::domain::DomainError;

/// Storage-level errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Entity not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(StorageError::NotFound.to_string(), "Entity not found");
        assert_eq!(
            StorageError::DuplicateKey("1111222233334444".to_string()).to_string(),
            "Duplicate key: 1111222233334444"
        );

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let storage_err = StorageError::from(io_err);
        assert!(storage_err.to_string().contains("I/O error"));
    }

    #[test]
    fn domain_error_conversion() {
        let storage_err = StorageError::from(DomainError::InsufficientBalance);

        match storage_err {
            StorageError::DomainError(DomainError::InsufficientBalance) => {}
            _ => panic!("Expected DomainError variant"),
        }
    }

    #[test]
    fn serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();

        match StorageError::from(json_err) {
            StorageError::Serialization(_) => {}
            _ => panic!("Expected Serialization variant"),
        }
    }
}

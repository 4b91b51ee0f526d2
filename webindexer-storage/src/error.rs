//! Storage error types.

use std::io;
use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error during a filesystem listing or write
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Directory or object not found
    #[error("Path not found: {0}")]
    NotFound(String),

    /// Invalid path or URI format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Storage client error not covered by another variant
    #[error("Backend error: {0}")]
    Backend(String),

    /// Object store error
    #[cfg(feature = "s3")]
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Check if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::NotFound(_) => true,
            StorageError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            #[cfg(feature = "s3")]
            StorageError::ObjectStore(object_store::Error::NotFound { .. }) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        let err = StorageError::NotFound("docs/".to_string());
        assert!(err.is_not_found());

        let io_err = StorageError::Io(io::Error::new(io::ErrorKind::NotFound, "not found"));
        assert!(io_err.is_not_found());

        let denied = StorageError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));
        assert!(!denied.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::InvalidPath("s3:///missing-bucket".to_string());
        assert_eq!(err.to_string(), "Invalid path: s3:///missing-bucket");
    }
}

//! Error types for medicine_prices

use medicine_common::ValidationError;
use thiserror::Error;

/// Unified error type for medicine_prices operations
#[derive(Debug, Error)]
pub enum MedicineError {
    /// Input rejected before any write happened
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),
    /// Database operation failed (connection, constraint violation, ...)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Could not prepare the database location on disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to render results as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MedicineError {
    /// True when the caller supplied bad input, as opposed to a storage failure
    pub fn is_validation(&self) -> bool {
        matches!(self, MedicineError::Validation(_))
    }
}

pub type Error = MedicineError;

/// Result alias for medicine_prices operations
pub type Result<T> = std::result::Result<T, MedicineError>;

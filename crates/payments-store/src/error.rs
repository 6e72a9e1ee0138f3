//! Error types for the store module.

use payments_core::PaymentId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Attributes could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A row already exists at this position in the version chain.
    #[error("conflict: payment {external_id} already has version {version}")]
    Conflict { external_id: PaymentId, version: u32 },

    /// Stored data that cannot be used, such as a version chain with no
    /// room for another row.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// The blocking task running a transaction failed without panicking
    /// (for example because the runtime is shutting down).
    #[error("storage task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether this is a uniqueness conflict on `(external_id, version)`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

//! Error types for the payments core.

use thiserror::Error;

/// Errors raised while building domain values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Text that is not a valid identifier.
    #[error("invalid id {input:?}: {source}")]
    InvalidId {
        input: String,
        #[source]
        source: uuid::Error,
    },
}

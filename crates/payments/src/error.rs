//! Error types for the payment repository.

use payments_store::StoreError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by [`PaymentService`](crate::PaymentService) operations.
///
/// Callers only ever see these two outcomes. Storage failures are logged
/// where they are translated and never exposed in the error itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// No visible current version exists for the requested payment.
    #[error("PAYMENT_NOT_FOUND")]
    NotFound,

    /// Any storage failure: connection, constraint, encoding, commit.
    #[error("SERVER_ERROR")]
    Server,
}

impl PaymentError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::NotFound => "PAYMENT_NOT_FOUND",
            PaymentError::Server => "SERVER_ERROR",
        }
    }

    /// Human-readable detail, safe to show to clients.
    pub fn detail(&self) -> &'static str {
        match self {
            PaymentError::NotFound => "We could not find a payment with the given ID",
            PaymentError::Server => "Sorry, something went wrong",
        }
    }
}

impl From<StoreError> for PaymentError {
    fn from(e: StoreError) -> Self {
        if e.is_conflict() {
            warn!(error = %e, "concurrent write lost the race for a version");
        } else {
            error!(error = %e, "storage failure");
        }
        PaymentError::Server
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use payments_core::PaymentId;

    #[test]
    fn test_display_is_code() {
        assert_eq!(PaymentError::NotFound.to_string(), "PAYMENT_NOT_FOUND");
        assert_eq!(PaymentError::Server.to_string(), PaymentError::Server.code());
    }

    #[test]
    fn test_store_errors_become_opaque() {
        let conflict = StoreError::Conflict {
            external_id: PaymentId::new(),
            version: 4,
        };
        assert_eq!(PaymentError::from(conflict), PaymentError::Server);

        let err = PaymentError::from(StoreError::InvalidData("corrupt row at sequence 7".into()));
        assert_eq!(err, PaymentError::Server);
        assert!(!err.to_string().contains("corrupt"));
        assert_eq!(err.detail(), "Sorry, something went wrong");
    }
}

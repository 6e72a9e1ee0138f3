//! The payment service boundary consumed by transport layers.

use async_trait::async_trait;
use payments_core::{NewPayment, Payment, PaymentId, Payments};

use crate::error::Result;

/// Create, fetch, list, update and soft-delete payments.
///
/// This is the whole contract a transport (HTTP, CLI, RPC) needs. Every
/// operation fails with either [`PaymentError::NotFound`] or
/// [`PaymentError::Server`]; storage details never cross this boundary.
///
/// [`PaymentError::NotFound`]: crate::PaymentError::NotFound
/// [`PaymentError::Server`]: crate::PaymentError::Server
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Store a new payment at version 0 and return its fresh id.
    async fn create(&self, payment: NewPayment) -> Result<PaymentId>;

    /// The current version of a payment, unless it is absent or deleted.
    async fn get(&self, id: &PaymentId) -> Result<Payment>;

    /// The current version of every payment that is not deleted.
    async fn get_all(&self) -> Result<Payments>;

    /// Append a new version with new content.
    async fn update(&self, id: &PaymentId, payment: NewPayment) -> Result<()>;

    /// Append a deleted version carrying the current content forward.
    async fn delete(&self, id: &PaymentId) -> Result<()>;
}

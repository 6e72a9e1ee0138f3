//! Store traits: the abstract interface for versioned payment persistence.
//!
//! The repository only ever talks to these traits, so the storage engine can
//! be SQLite (primary) or in-memory (for tests).

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use payments_core::{PaymentId, PaymentVersion};

use crate::error::{Result, StoreError};

/// Operations on the version log, available inside one transaction.
///
/// Every read sees the writes made earlier in the same transaction.
pub trait VersionLog {
    /// Append one row.
    ///
    /// Returns the number of rows written. Fails with
    /// [`StoreError::Conflict`] if the payment already has a row at
    /// `row.version`.
    fn insert_version(&mut self, row: &PaymentVersion) -> Result<usize>;

    /// The row with the highest version for `id`, deleted or not.
    ///
    /// `None` when the payment has no rows at all.
    fn current_version(&mut self, id: &PaymentId) -> Result<Option<PaymentVersion>>;

    /// The current row of every payment whose current row is not deleted,
    /// ordered by external id.
    fn all_current_versions(&mut self) -> Result<Vec<PaymentVersion>>;

    /// Every row of one payment, ordered by version.
    fn history(&mut self, id: &PaymentId) -> Result<Vec<PaymentVersion>>;
}

/// The Store trait: runs work against the version log inside a transaction.
///
/// # Transaction contract
///
/// - The closure's writes are committed only if it returns `Ok`.
/// - On `Err` the transaction is rolled back and the error returned as is.
/// - If the closure panics the transaction is rolled back and the panic
///   resumes in the caller.
///
/// The closure's error type belongs to the caller, so domain errors can
/// abort a transaction as well as storage errors can.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run `f` inside a single storage transaction.
    async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn VersionLog) -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static;
}

/// A shared store is still a store.
#[async_trait]
impl<S: Store> Store for Arc<S> {
    async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn VersionLog) -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        (**self).transaction(f).await
    }
}

/// Extension trait: single operations, each in its own transaction.
pub trait StoreExt: Store {
    /// Append one row.
    fn insert_version(&self, row: &PaymentVersion) -> impl Future<Output = Result<usize>> + Send;

    /// The highest-version row for `id`, deleted or not.
    fn current_version(
        &self,
        id: &PaymentId,
    ) -> impl Future<Output = Result<Option<PaymentVersion>>> + Send;

    /// The current row of every non-deleted payment.
    fn all_current_versions(&self) -> impl Future<Output = Result<Vec<PaymentVersion>>> + Send;

    /// Every row of one payment, ordered by version.
    fn history(&self, id: &PaymentId) -> impl Future<Output = Result<Vec<PaymentVersion>>> + Send;
}

impl<S: Store> StoreExt for S {
    async fn insert_version(&self, row: &PaymentVersion) -> Result<usize> {
        let row = row.clone();
        self.transaction(move |log| log.insert_version(&row)).await
    }

    async fn current_version(&self, id: &PaymentId) -> Result<Option<PaymentVersion>> {
        let id = *id;
        self.transaction(move |log| log.current_version(&id)).await
    }

    async fn all_current_versions(&self) -> Result<Vec<PaymentVersion>> {
        self.transaction(|log| log.all_current_versions()).await
    }

    async fn history(&self, id: &PaymentId) -> Result<Vec<PaymentVersion>> {
        let id = *id;
        self.transaction(move |log| log.history(&id)).await
    }
}

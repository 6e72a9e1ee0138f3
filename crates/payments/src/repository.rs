//! The Repository: payment operations over a versioned record store.
//!
//! Every operation runs inside one store transaction. Mutations read the
//! current version and append `version + 1` in that same transaction, so two
//! writers racing for the same next version cannot both win: the store's
//! uniqueness constraint rejects the loser, which surfaces as
//! [`PaymentError::Server`]. There is no retry.

use async_trait::async_trait;
use tracing::{debug, info};

use payments_core::{NewPayment, Payment, PaymentId, PaymentVersion, Payments};
use payments_store::{SqliteStore, Store, StoreError};

use crate::config::DatabaseConfig;
use crate::error::{PaymentError, Result};
use crate::service::PaymentService;

/// Payment repository over an injected store.
pub struct Repository<S: Store> {
    /// The storage backend.
    store: S,
}

impl<S: Store> Repository<S> {
    /// Create a repository over `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every stored version of a payment, oldest first, tombstones included.
    ///
    /// Fails with [`PaymentError::NotFound`] only if the payment never existed.
    pub async fn history(&self, id: &PaymentId) -> Result<Vec<PaymentVersion>> {
        let id = *id;
        let rows = self
            .store
            .transaction(move |log| -> Result<Vec<PaymentVersion>> { Ok(log.history(&id)?) })
            .await?;

        if rows.is_empty() {
            debug!(payment_id = %id, "no history for payment");
            return Err(PaymentError::NotFound);
        }
        Ok(rows)
    }
}

impl Repository<SqliteStore> {
    /// Open (and migrate) the configured SQLite database.
    pub fn open(config: &DatabaseConfig) -> std::result::Result<Self, StoreError> {
        let store = match &config.path {
            Some(path) => SqliteStore::open_with(path, &config.sqlite_options())?,
            None => SqliteStore::open_memory()?,
        };
        Ok(Self::new(store))
    }
}

#[async_trait]
impl<S: Store> PaymentService for Repository<S> {
    async fn create(&self, payment: NewPayment) -> Result<PaymentId> {
        let id = PaymentId::new();
        let row = PaymentVersion::initial(id, payment.organisation_id, payment.attributes);

        self.store
            .transaction(move |log| -> Result<()> {
                log.insert_version(&row)?;
                Ok(())
            })
            .await?;

        info!(payment_id = %id, "created payment");
        Ok(id)
    }

    async fn get(&self, id: &PaymentId) -> Result<Payment> {
        let id = *id;
        let current = self
            .store
            .transaction(move |log| -> Result<Option<PaymentVersion>> {
                Ok(log.current_version(&id)?)
            })
            .await?;

        match current {
            Some(row) if !row.deleted => Ok(row.into()),
            _ => {
                debug!(payment_id = %id, "payment not visible");
                Err(PaymentError::NotFound)
            }
        }
    }

    async fn get_all(&self) -> Result<Payments> {
        let rows = self
            .store
            .transaction(|log| -> Result<Vec<PaymentVersion>> { Ok(log.all_current_versions()?) })
            .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn update(&self, id: &PaymentId, payment: NewPayment) -> Result<()> {
        let id = *id;
        let version = self
            .store
            .transaction(move |log| -> Result<u32> {
                // A deleted current row is revived here, not rejected.
                let current = log.current_version(&id)?.ok_or(PaymentError::NotFound)?;
                let next = current
                    .superseded_by(payment.organisation_id, payment.attributes)
                    .ok_or_else(|| chain_exhausted(&current))?;

                if log.insert_version(&next)? == 0 {
                    return Err(PaymentError::NotFound);
                }
                Ok(next.version)
            })
            .await?;

        info!(payment_id = %id, version, "updated payment");
        Ok(())
    }

    async fn delete(&self, id: &PaymentId) -> Result<()> {
        let id = *id;
        let version = self
            .store
            .transaction(move |log| -> Result<u32> {
                let current = log
                    .current_version(&id)?
                    .filter(|row| !row.deleted)
                    .ok_or(PaymentError::NotFound)?;
                let tombstone = current.tombstone().ok_or_else(|| chain_exhausted(&current))?;

                if log.insert_version(&tombstone)? == 0 {
                    return Err(PaymentError::NotFound);
                }
                Ok(tombstone.version)
            })
            .await?;

        info!(payment_id = %id, version, "deleted payment");
        Ok(())
    }
}

fn chain_exhausted(current: &PaymentVersion) -> StoreError {
    StoreError::InvalidData(format!(
        "payment {} has no version after {}",
        current.external_id, current.version
    ))
}

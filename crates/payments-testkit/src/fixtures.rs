//! Test fixtures and helpers.
//!
//! Common setup code for repository tests: a fresh store, a repository over
//! the same store, and direct row seeding that bypasses the repository.

use std::sync::Arc;

use payments::Repository;
use payments_core::{Attributes, OrganisationId, PaymentId, PaymentVersion};
use payments_store::{MemoryStore, SqliteStore, Store, StoreExt};

/// A store and a repository over it.
pub struct TestFixture<S: Store> {
    pub store: Arc<S>,
    pub repository: Repository<Arc<S>>,
}

impl TestFixture<SqliteStore> {
    /// Fixture over a fresh in-memory SQLite database.
    pub fn sqlite() -> Self {
        Self::with_store(SqliteStore::open_memory().expect("open in-memory sqlite"))
    }
}

impl TestFixture<MemoryStore> {
    /// Fixture over a fresh [`MemoryStore`].
    pub fn memory() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl<S: Store> TestFixture<S> {
    /// Fixture over an existing store.
    pub fn with_store(store: S) -> Self {
        let store = Arc::new(store);
        Self {
            repository: Repository::new(store.clone()),
            store,
        }
    }

    /// Insert a row directly, as another writer (or an old deployment) would.
    pub async fn seed(&self, row: &PaymentVersion) {
        self.store.insert_version(row).await.expect("seed row");
    }

    /// Seed version 0 of a new payment owned by a random organisation.
    pub async fn seed_payment(&self, attributes: Attributes) -> PaymentVersion {
        let row = PaymentVersion::initial(PaymentId::new(), OrganisationId::random(), attributes);
        self.seed(&row).await;
        row
    }

    /// Seed a chain of live versions 0..n for one payment, returning the last.
    pub async fn seed_chain(
        &self,
        organisation_id: OrganisationId,
        attributes: impl IntoIterator<Item = Attributes>,
    ) -> Option<PaymentVersion> {
        let id = PaymentId::new();
        let mut last: Option<PaymentVersion> = None;
        for attrs in attributes {
            let row = match &last {
                Some(prev) => prev
                    .superseded_by(organisation_id, attrs)
                    .expect("version chain fits in u32"),
                None => PaymentVersion::initial(id, organisation_id, attrs),
            };
            self.seed(&row).await;
            last = Some(row);
        }
        last
    }

    /// Every stored row of a payment, oldest first.
    pub async fn rows(&self, id: &PaymentId) -> Vec<PaymentVersion> {
        self.store.history(id).await.expect("read history")
    }
}

//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use payments_core::{PaymentId, PaymentVersion};

use crate::error::{Result, StoreError};
use crate::traits::{Store, VersionLog};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Transactions are fully
/// serialized: one holds the lock from its first read to its commit.
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Every committed row, in insertion order.
    rows: Vec<PaymentVersion>,

    /// Position index: (external_id, version) pairs already taken.
    positions: HashSet<(PaymentId, u32)>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryStoreInner::default()),
        }
    }

    /// Number of committed rows, across all payments and versions.
    pub fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        // Staged rows are discarded on panic, so committed state is intact.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut dyn VersionLog) -> std::result::Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        let mut inner = self.lock();

        let mut log = MemoryLog {
            committed: &inner,
            staged: Vec::new(),
        };
        let value = f(&mut log as &mut dyn VersionLog)?;
        let staged = log.staged;

        for row in staged {
            inner.positions.insert((row.external_id, row.version));
            inner.rows.push(row);
        }
        Ok(value)
    }
}

/// The version log inside one in-memory transaction.
///
/// Writes go to `staged` and become visible to other transactions only when
/// the transaction commits.
struct MemoryLog<'a> {
    committed: &'a MemoryStoreInner,
    staged: Vec<PaymentVersion>,
}

impl MemoryLog<'_> {
    fn rows(&self) -> impl Iterator<Item = &PaymentVersion> {
        self.committed.rows.iter().chain(self.staged.iter())
    }

    fn is_taken(&self, id: &PaymentId, version: u32) -> bool {
        self.committed.positions.contains(&(*id, version))
            || self
                .staged
                .iter()
                .any(|r| r.external_id == *id && r.version == version)
    }
}

impl VersionLog for MemoryLog<'_> {
    fn insert_version(&mut self, row: &PaymentVersion) -> Result<usize> {
        if self.is_taken(&row.external_id, row.version) {
            return Err(StoreError::Conflict {
                external_id: row.external_id,
                version: row.version,
            });
        }

        self.staged.push(row.clone());
        debug!(
            external_id = %row.external_id,
            version = row.version,
            deleted = row.deleted,
            "staged payment version"
        );
        Ok(1)
    }

    fn current_version(&mut self, id: &PaymentId) -> Result<Option<PaymentVersion>> {
        Ok(self
            .rows()
            .filter(|r| r.external_id == *id)
            .max_by_key(|r| r.version)
            .cloned())
    }

    fn all_current_versions(&mut self) -> Result<Vec<PaymentVersion>> {
        let mut latest: Vec<&PaymentVersion> = Vec::new();
        for row in self.rows() {
            match latest.iter_mut().find(|r| r.external_id == row.external_id) {
                Some(slot) if slot.version < row.version => *slot = row,
                Some(_) => {}
                None => latest.push(row),
            }
        }

        let mut current: Vec<PaymentVersion> = latest
            .into_iter()
            .filter(|r| !r.deleted)
            .cloned()
            .collect();
        current.sort_by_key(|r| r.external_id);
        Ok(current)
    }

    fn history(&mut self, id: &PaymentId) -> Result<Vec<PaymentVersion>> {
        let mut rows: Vec<PaymentVersion> = self
            .rows()
            .filter(|r| r.external_id == *id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.version);
        Ok(rows)
    }
}

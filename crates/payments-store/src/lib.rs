//! # Payments Store
//!
//! The versioned record store behind the payments service. Payment versions
//! live in a single append-only table keyed by `(external_id, version)`;
//! nothing is ever updated or removed in place.
//!
//! ## Overview
//!
//! The store is abstracted behind the [`Store`] trait so the repository can
//! run against any backend. The primary implementation is [`SqliteStore`],
//! with [`MemoryStore`] for tests.
//!
//! ## Key Types
//!
//! - [`Store`] - Runs a closure inside one storage transaction
//! - [`VersionLog`] - The operations available inside that transaction
//! - [`StoreExt`] - One-shot operations, each in its own transaction
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use payments_core::{OrganisationId, PaymentId, PaymentVersion};
//! use payments_store::{SqliteStore, Store, StoreExt};
//!
//! async fn example() -> payments_store::Result<()> {
//!     let store = SqliteStore::open("payments.db")?;
//!
//!     let id = PaymentId::new();
//!     let v0 = PaymentVersion::initial(id, OrganisationId::random(), serde_json::json!({}));
//!     store.insert_version(&v0).await?;
//!
//!     // Read-modify-write in one transaction
//!     store
//!         .transaction(move |log| {
//!             let current = log.current_version(&id)?;
//!             if let Some(tombstone) = current.and_then(|c| c.tombstone()) {
//!                 log.insert_version(&tombstone)?;
//!             }
//!             Ok::<_, payments_store::StoreError>(())
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: updates and deletes are new rows with `version + 1`
//! - **Derived current row**: the current version is always the max version,
//!   never a stored flag
//! - **Conflict detection**: a second row at the same `(external_id, version)`
//!   fails with [`StoreError::Conflict`]
//! - **Visibility is not a store concern**: [`VersionLog::current_version`]
//!   returns deleted rows too; callers decide what a tombstone means

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::{SqliteOptions, SqliteStore};
pub use traits::{Store, StoreExt, VersionLog};

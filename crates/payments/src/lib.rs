//! # Payments
//!
//! Versioned payment records: create, fetch, list, update and soft-delete,
//! on top of an append-only record store.
//!
//! ## Overview
//!
//! - **Versions**: a payment is a chain of immutable rows, `version` 0, 1, 2, ...
//! - **Current version**: the row with the highest version
//! - **Soft delete**: deleting appends a row flagged `deleted`; readers then
//!   treat the payment as absent
//! - **Transactions**: every mutation reads the current version and appends
//!   the next one inside a single store transaction
//!
//! ## Usage
//!
//! ```rust,no_run
//! use payments::{NewPayment, OrganisationId, PaymentService, Repository};
//! use payments::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("payments.db").unwrap();
//!     let repository = Repository::new(store);
//!
//!     let org = OrganisationId::random();
//!     let id = repository
//!         .create(NewPayment::new(org, serde_json::json!({"amount": "100.21"})))
//!         .await
//!         .unwrap();
//!
//!     let payment = repository.get(&id).await.unwrap();
//!     assert_eq!(payment.version, 0);
//!
//!     repository.delete(&id).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `payments::core` - Domain types (PaymentId, PaymentVersion, ...)
//! - `payments::store` - Store traits, SQLite and in-memory backends

pub mod config;
pub mod error;
pub mod repository;
pub mod service;

// Re-export component crates
pub use payments_core as core;
pub use payments_store as store;

// Re-export main types for convenience
pub use config::{Config, ConfigError, DatabaseConfig, LogConfig};
pub use error::{PaymentError, Result};
pub use repository::Repository;
pub use service::PaymentService;

// Re-export commonly used core types
pub use payments_core::{
    Attributes, NewPayment, OrganisationId, Payment, PaymentId, PaymentVersion, Payments,
};

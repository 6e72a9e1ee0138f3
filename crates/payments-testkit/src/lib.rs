//! # Payments Testkit
//!
//! Testing utilities for the payments service.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a store plus a repository sharing it, with helpers to seed
//!   rows directly before a test runs
//! - **Generators**: Proptest strategies for attributes, organisations and
//!   sequences of mutations
//!
//! ## Test Fixtures
//!
//! ```rust
//! use payments_testkit::fixtures::TestFixture;
//! use payments::PaymentService;
//!
//! # async fn example() {
//! let fixture = TestFixture::sqlite();
//! let v0 = fixture.seed_payment(serde_json::json!({"key": "value"})).await;
//! let payment = fixture.repository.get(&v0.external_id).await.unwrap();
//! assert_eq!(payment.version, 0);
//! # }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use payments_testkit::generators::mutations;
//!
//! proptest! {
//!     #[test]
//!     fn version_tracks_mutations(ops in mutations(8)) {
//!         // create, apply `ops`, check the version chain
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::TestFixture;
pub use generators::{attributes, mutations, organisation_id, Mutation};

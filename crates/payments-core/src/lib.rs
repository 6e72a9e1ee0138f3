//! # Payments Core
//!
//! Pure domain types for the payments service: identifiers, stored versions,
//! and the records handed to callers.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`PaymentId`] - Stable public identifier of a logical payment
//! - [`OrganisationId`] - Owning organisation
//! - [`PaymentVersion`] - One row of the append-only version log
//! - [`Payment`] - The visible, current state of a payment
//! - [`Payments`] - List envelope (`{"data": [...]}`)
//!
//! ## Versioning
//!
//! A payment is never edited in place. Every change appends a new
//! [`PaymentVersion`] whose `version` is one greater than the previous one.
//! The row with the highest version is the current one; if it carries
//! `deleted = true` the payment is gone for every reader.

pub mod error;
pub mod payment;
pub mod types;

pub use error::CoreError;
pub use payment::{Attributes, NewPayment, Payment, PaymentVersion, Payments};
pub use types::{OrganisationId, PaymentId};

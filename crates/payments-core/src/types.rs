//! Strong type definitions for the payments service.
//!
//! Identifiers are newtypes over [`Uuid`] so a payment id can never be passed
//! where an organisation id is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0.hyphenated())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|source| CoreError::InvalidId {
                        input: s.to_string(),
                        source,
                    })
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Stable public identifier of a logical payment across all its versions.
    PaymentId
);

uuid_id!(
    /// Identifier of the organisation that owns a payment.
    OrganisationId
);

impl PaymentId {
    /// Generate a fresh random (v4) payment id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl OrganisationId {
    /// Generate a random (v4) organisation id.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_id_text_roundtrip() {
        let id = PaymentId::new();
        let text = id.to_string();
        let parsed: PaymentId = text.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_display_is_hyphenated_lowercase() {
        let id: OrganisationId = "EFA9C7A2-5BC7-461B-A977-20853C7221CD".parse().unwrap();
        assert_eq!(id.to_string(), "efa9c7a2-5bc7-461b-a977-20853c7221cd");
    }

    #[test]
    fn test_invalid_id_rejected() {
        let err = "not-a-uuid".parse::<PaymentId>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidId { ref input, .. } if input == "not-a-uuid"));
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(PaymentId::new(), PaymentId::new());
    }

    #[test]
    fn test_debug_names_the_type() {
        let debug = format!("{:?}", OrganisationId::from_uuid(Uuid::nil()));
        assert_eq!(debug, "OrganisationId(00000000-0000-0000-0000-000000000000)");
    }

    #[test]
    fn test_text_order_matches_id_order() {
        let a: PaymentId = "0a000000-0000-4000-8000-000000000000".parse().unwrap();
        let b: PaymentId = "a0000000-0000-4000-8000-000000000000".parse().unwrap();
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }
}

//! Payment records: the stored version rows and the views handed to callers.

use serde::{Deserialize, Serialize};

use crate::types::{OrganisationId, PaymentId};

/// Business payload of a payment.
///
/// Opaque to this service: it is stored and returned exactly as given.
pub type Attributes = serde_json::Value;

/// One row of the append-only version log.
///
/// Rows are never mutated. An update or delete appends a new row with
/// `version + 1`; the highest version is the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVersion {
    /// Stable identifier shared by every version of the payment.
    pub external_id: PaymentId,
    /// Position in the version chain, starting at 0.
    pub version: u32,
    /// Owning organisation as of this version.
    pub organisation_id: OrganisationId,
    /// Business payload as of this version.
    pub attributes: Attributes,
    /// Soft-delete marker.
    pub deleted: bool,
}

impl PaymentVersion {
    /// Version 0 of a new payment.
    pub fn initial(
        external_id: PaymentId,
        organisation_id: OrganisationId,
        attributes: Attributes,
    ) -> Self {
        Self {
            external_id,
            version: 0,
            organisation_id,
            attributes,
            deleted: false,
        }
    }

    /// The version number after this one, `None` once the chain is exhausted.
    pub fn next_version(&self) -> Option<u32> {
        self.version.checked_add(1)
    }

    /// The row that replaces this one with new content.
    ///
    /// The result is never deleted, whatever this row's flag says. `None` if
    /// this row already sits at `u32::MAX`.
    pub fn superseded_by(
        &self,
        organisation_id: OrganisationId,
        attributes: Attributes,
    ) -> Option<Self> {
        Some(Self {
            external_id: self.external_id,
            version: self.next_version()?,
            organisation_id,
            attributes,
            deleted: false,
        })
    }

    /// The tombstone row for this payment, carrying the current content forward.
    pub fn tombstone(&self) -> Option<Self> {
        Some(Self {
            external_id: self.external_id,
            version: self.next_version()?,
            organisation_id: self.organisation_id,
            attributes: self.attributes.clone(),
            deleted: true,
        })
    }
}

/// The visible state of a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub version: u32,
    pub organisation_id: OrganisationId,
    pub attributes: Attributes,
}

impl From<PaymentVersion> for Payment {
    fn from(row: PaymentVersion) -> Self {
        Self {
            id: row.external_id,
            version: row.version,
            organisation_id: row.organisation_id,
            attributes: row.attributes,
        }
    }
}

/// A list of payments, wrapped the way it is returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payments {
    pub data: Vec<Payment>,
}

impl Payments {
    /// Number of payments in the list.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the list holds no payments.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl FromIterator<Payment> for Payments {
    fn from_iter<I: IntoIterator<Item = Payment>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// Content supplied by a caller to create or update a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub organisation_id: OrganisationId,
    pub attributes: Attributes,
}

impl NewPayment {
    /// Request body with the given owner and payload.
    pub fn new(organisation_id: OrganisationId, attributes: Attributes) -> Self {
        Self {
            organisation_id,
            attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_superseded_by_advances_version() {
        let v0 = PaymentVersion::initial(PaymentId::new(), OrganisationId::random(), json!({"key": "value"}));
        let org = OrganisationId::random();
        let v1 = v0.superseded_by(org, json!({"key": "new"})).unwrap();

        assert_eq!(v1.external_id, v0.external_id);
        assert_eq!(v1.version, 1);
        assert_eq!(v1.organisation_id, org);
        assert_eq!(v1.attributes, json!({"key": "new"}));
        assert!(!v1.deleted);
    }

    #[test]
    fn test_superseded_by_clears_deleted() {
        let v0 = PaymentVersion::initial(PaymentId::new(), OrganisationId::random(), json!({}));
        let v1 = v0.tombstone().unwrap();
        let v2 = v1.superseded_by(v0.organisation_id, json!({"revived": true})).unwrap();
        assert_eq!(v2.version, 2);
        assert!(!v2.deleted);
    }

    #[test]
    fn test_tombstone_copies_content_forward() {
        let v0 = PaymentVersion::initial(PaymentId::new(), OrganisationId::random(), json!({"a": 1}));
        let t = v0.tombstone().unwrap();
        assert_eq!(t.version, 1);
        assert!(t.deleted);
        assert_eq!(t.organisation_id, v0.organisation_id);
        assert_eq!(t.attributes, v0.attributes);
    }

    #[test]
    fn test_chain_ends_at_max_version() {
        let last = PaymentVersion {
            version: u32::MAX,
            ..PaymentVersion::initial(PaymentId::new(), OrganisationId::random(), json!({}))
        };
        assert_eq!(last.next_version(), None);
        assert!(last.superseded_by(last.organisation_id, json!({})).is_none());
        assert!(last.tombstone().is_none());
    }

    #[test]
    fn test_payment_json_field_names() {
        let id: PaymentId = "4ee3a8d8-ca7b-4290-a52c-dd5b6165ec43".parse().unwrap();
        let org: OrganisationId = "743d5b63-8e6f-432e-a8fa-c5d8d2ee5fcb".parse().unwrap();
        let payment = Payment {
            id,
            version: 3,
            organisation_id: org,
            attributes: json!({"amount": "100.21"}),
        };

        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "4ee3a8d8-ca7b-4290-a52c-dd5b6165ec43",
                "version": 3,
                "organisation_id": "743d5b63-8e6f-432e-a8fa-c5d8d2ee5fcb",
                "attributes": {"amount": "100.21"}
            })
        );
    }

    #[test]
    fn test_empty_payments_envelope() {
        let value = serde_json::to_value(Payments::default()).unwrap();
        assert_eq!(value, json!({"data": []}));
    }
}

//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};
use uuid::Uuid;

use payments_core::{Attributes, NewPayment, OrganisationId};

/// Generate a random OrganisationId.
pub fn organisation_id() -> impl Strategy<Value = OrganisationId> {
    any::<[u8; 16]>().prop_map(|bytes| OrganisationId::from_uuid(Uuid::from_bytes(bytes)))
}

/// Generate a JSON leaf value.
fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::String),
    ]
}

/// Generate an attributes document: a JSON object up to two levels deep.
pub fn attributes() -> impl Strategy<Value = Attributes> {
    let nested = prop::collection::btree_map("[a-z_]{1,8}", leaf(), 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()));

    prop::collection::btree_map("[a-z_]{1,12}", prop_oneof![3 => leaf(), 1 => nested], 0..6)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

/// Generate a create/update request body.
pub fn new_payment() -> impl Strategy<Value = NewPayment> {
    (organisation_id(), attributes()).prop_map(|(org, attrs)| NewPayment::new(org, attrs))
}

/// A mutation applied to an existing payment.
#[derive(Debug, Clone)]
pub enum Mutation {
    Update(NewPayment),
    Delete,
}

/// Generate a single mutation, updates three times as likely as deletes.
pub fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        3 => new_payment().prop_map(Mutation::Update),
        1 => Just(Mutation::Delete),
    ]
}

/// Generate up to `max_len` mutations.
pub fn mutations(max_len: usize) -> impl Strategy<Value = Vec<Mutation>> {
    prop::collection::vec(mutation(), 0..=max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn attributes_are_objects(attrs in attributes()) {
            prop_assert!(attrs.is_object());
        }

        #[test]
        fn attributes_survive_json_text(attrs in attributes()) {
            let text = serde_json::to_string(&attrs).unwrap();
            let back: Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(back, attrs);
        }
    }
}

//! Address manipulation: redirect recipients and shipping addresses.

use serde_json::{json, Value};

use super::types::Change;
use crate::message::{FieldExt, Message};

/// Flattened replacement for the legacy string-typed shipping address.
const LEGACY_ATTACKER_ADDRESS: &str = "Attacker Street 123, Hacker City, 00000";

/// Structured replacement shipping address.
fn attacker_shipping_address() -> Message {
    let mut address = Message::new();
    address.insert("street".to_string(), json!("Attacker Street 123"));
    address.insert("city".to_string(), json!("Hacker City"));
    address.insert("zipcode".to_string(), json!("00000"));
    address.insert("country".to_string(), json!("Darknet"));
    address
}

/// Apply the address manipulation to an independent copy of `original`.
/// Rewrites the top-level recipient, the structured `shippingAddress` and
/// `recipient` inside `parameters`, and the legacy flat
/// `shipping_address` string, wherever each is present.
pub fn apply(original: &Message, attacker_wallet: &str) -> (Message, Vec<Change>) {
    let mut modified = original.clone();
    let mut changes = Vec::new();

    if let Some(recipient) = original.get_str("recipient").filter(|r| !r.is_empty()) {
        modified.insert("recipient".to_string(), json!(attacker_wallet));
        changes.push(Change::new("recipient", json!(recipient), json!(attacker_wallet)));
    }

    if let Some(parameters) = original.get_object("parameters") {
        let mut new_parameters = parameters.clone();

        if let Some(shipping) = parameters.get_object("shippingAddress") {
            let replacement = attacker_shipping_address();
            changes.push(Change::new(
                "parameters.shippingAddress",
                Value::Object(shipping.clone()),
                Value::Object(replacement.clone()),
            ));
            new_parameters.insert("shippingAddress".to_string(), Value::Object(replacement));
        }

        if let Some(recipient) = parameters.get_str("recipient").filter(|r| !r.is_empty()) {
            new_parameters.insert("recipient".to_string(), json!(attacker_wallet));
            changes.push(Change::new(
                "parameters.recipient",
                json!(recipient),
                json!(attacker_wallet),
            ));
        }

        modified.insert("parameters".to_string(), Value::Object(new_parameters));
    }

    if let Some(shipping) = original.get_str("shipping_address").filter(|s| !s.is_empty()) {
        modified.insert("shipping_address".to_string(), json!(LEGACY_ATTACKER_ADDRESS));
        changes.push(Change::new(
            "shipping_address",
            json!(shipping),
            json!(LEGACY_ATTACKER_ADDRESS),
        ));
    }

    (modified, changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::codec::decode;

    #[test]
    fn redirects_top_level_recipient() {
        let original = decode(br#"{"recipient":"0x742d","amount":10}"#).unwrap();
        let (modified, changes) = apply(&original, "0xEVIL");
        assert_eq!(modified.get_str("recipient"), Some("0xEVIL"));
        assert_eq!(modified.get_f64("amount"), Some(10.0));
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn replaces_structured_shipping_address() {
        let original = decode(
            br#"{"parameters":{"shippingAddress":{"street":"Real St 1","city":"Seoul","zipcode":"04524","country":"KR"},"recipient":"0xAA"}}"#,
        )
        .unwrap();
        let (modified, changes) = apply(&original, "0xEVIL");

        let parameters = modified.get_object("parameters").unwrap();
        let shipping = parameters.get_object("shippingAddress").unwrap();
        assert_eq!(shipping.get_str("street"), Some("Attacker Street 123"));
        assert_eq!(shipping.get_str("country"), Some("Darknet"));
        assert_eq!(parameters.get_str("recipient"), Some("0xEVIL"));
        assert_eq!(changes.len(), 2);

        // the input's nested object must be untouched
        let original_shipping = original
            .get_object("parameters")
            .unwrap()
            .get_object("shippingAddress")
            .unwrap();
        assert_eq!(original_shipping.get_str("city"), Some("Seoul"));
    }

    #[test]
    fn rewrites_legacy_flat_address() {
        let original = decode(br#"{"shipping_address":"Real Street 5, Busan"}"#).unwrap();
        let (modified, changes) = apply(&original, "0xEVIL");
        assert_eq!(modified.get_str("shipping_address"), Some(LEGACY_ATTACKER_ADDRESS));
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn no_target_fields_is_a_quiet_noop() {
        let original = decode(br#"{"amount":10,"product":"Pen"}"#).unwrap();
        let (modified, changes) = apply(&original, "0xEVIL");
        assert_eq!(modified, original);
        assert!(changes.is_empty());
    }

    #[test]
    fn empty_recipient_is_not_rewritten() {
        let original = decode(br#"{"recipient":""}"#).unwrap();
        let (modified, changes) = apply(&original, "0xEVIL");
        assert_eq!(modified.get_str("recipient"), Some(""));
        assert!(changes.is_empty());
    }
}

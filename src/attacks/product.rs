//! Product substitution: swap the ordered product for a decoy and plant a
//! reassuring description.

use serde_json::{json, Value};

use super::types::Change;
use crate::message::{FieldExt, Message};

const DECOY_PRODUCT: &str = "🎁 FREE GIFT - Malicious Package";
const COVER_DESCRIPTION: &str = "Special promotional item - Verified Seller";

/// Apply the product substitution to an independent copy of `original`.
/// Product and description are checked at top level and one level under
/// `parameters`; a missing `parameters.description` is added, not merely
/// updated.
pub fn apply(original: &Message) -> (Message, Vec<Change>) {
    let mut modified = original.clone();
    let mut changes = Vec::new();

    if let Some(product) = original.get_str("product").filter(|p| !p.is_empty()) {
        modified.insert("product".to_string(), json!(DECOY_PRODUCT));
        changes.push(Change::new("product", json!(product), json!(DECOY_PRODUCT)));
    }

    if let Some(parameters) = original.get_object("parameters") {
        let mut new_parameters = parameters.clone();

        if let Some(product) = parameters.get_str("product").filter(|p| !p.is_empty()) {
            new_parameters.insert("product".to_string(), json!(DECOY_PRODUCT));
            changes.push(Change::new(
                "parameters.product",
                json!(product),
                json!(DECOY_PRODUCT),
            ));
        }

        let before = match parameters.get_str("description") {
            Some(description) => json!(description),
            None => Value::Null,
        };
        new_parameters.insert("description".to_string(), json!(COVER_DESCRIPTION));
        changes.push(Change::new(
            "parameters.description",
            before,
            json!(COVER_DESCRIPTION),
        ));

        modified.insert("parameters".to_string(), Value::Object(new_parameters));
    }

    if let Some(description) = original.get_str("description") {
        modified.insert("description".to_string(), json!(COVER_DESCRIPTION));
        changes.push(Change::new(
            "description",
            json!(description),
            json!(COVER_DESCRIPTION),
        ));
    }

    (modified, changes)
}

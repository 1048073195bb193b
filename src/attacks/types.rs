//! Shared attack data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Message;

/// The closed set of message-transformation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    PriceManipulation,
    AddressManipulation,
    ProductSubstitution,
    #[serde(rename = "encrypted_payload_bitflip")]
    EncryptedBitFlip,
    None,
}

impl AttackType {
    /// Wire/config name of the variant.
    pub fn name(self) -> &'static str {
        match self {
            AttackType::PriceManipulation => "price_manipulation",
            AttackType::AddressManipulation => "address_manipulation",
            AttackType::ProductSubstitution => "product_substitution",
            AttackType::EncryptedBitFlip => "encrypted_payload_bitflip",
            AttackType::None => "none",
        }
    }

    /// Parse a configured variant name. `EncryptedBitFlip` is not a valid
    /// operator choice; it is only ever forced by the selector.
    pub fn from_config_name(name: &str) -> Option<AttackType> {
        match name {
            "price_manipulation" => Some(AttackType::PriceManipulation),
            "address_manipulation" => Some(AttackType::AddressManipulation),
            "product_substitution" => Some(AttackType::ProductSubstitution),
            "none" => Some(AttackType::None),
            _ => Option::None,
        }
    }
}

impl std::fmt::Display for AttackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One field modification: path plus before/after values. Append-only
/// during a single variant invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub field: String,
    pub original_value: Value,
    pub modified_value: Value,
}

impl Change {
    pub fn new(field: impl Into<String>, original_value: Value, modified_value: Value) -> Self {
        Self {
            field: field.into(),
            original_value,
            modified_value,
        }
    }
}

/// Audit record for one applied transformation. Created once, immutable,
/// handed to the event hub by value.
#[derive(Debug, Clone, Serialize)]
pub struct AttackRecord {
    pub timestamp: DateTime<Utc>,
    pub attack_type: AttackType,
    pub original_message: Message,
    pub modified_message: Message,
    pub changes: Vec<Change>,
    pub target_endpoint: String,
}

//! Transport-security state detection.
//!
//! # Responsibilities
//! - Inspect inbound headers for HTTP message signatures (value +
//!   parameters header pair)
//! - Inspect the decoded body for encrypted-payload markers
//!
//! # Design Decisions
//! - Pure function of the request; nothing is cached or persisted
//! - Algorithm identification is substring-based, not a full
//!   Signature-Input grammar parse. Known limitation: families other
//!   than ecdsa/secp256k1 are left unidentified.
//! - Invalid JSON bodies are never an error here; they simply carry no
//!   encryption markers

use axum::http::HeaderMap;
use serde::Serialize;
use serde_json::Value;

/// Recognized encrypted-payload field names, in lookup order.
pub const ENCRYPTED_PAYLOAD_FIELDS: [&str; 3] = ["encryptedPayload", "ciphertext", "enc_data"];

/// Type-discriminator values that mark a sealed message.
const SECURE_TYPE_TAGS: [&str; 2] = ["secure", "encrypted"];

/// Transport-security classification of a single request. Immutable once
/// computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProtocolState {
    /// Paired signature value + parameters headers were both present.
    pub signature_present: bool,
    /// Signature identifier token, when recognizable.
    pub signature_id: Option<String>,
    /// Heuristically identified algorithm family.
    pub signature_algorithm: Option<String>,
    /// Body carries an encrypted payload or secure type tag.
    pub encryption_present: bool,
}

impl ProtocolState {
    /// True when the message carries any transport-security layer.
    pub fn is_secure(&self) -> bool {
        self.signature_present || self.encryption_present
    }
}

/// Classify a request from its headers and raw body.
pub fn detect(headers: &HeaderMap, raw_body: &[u8]) -> ProtocolState {
    let mut state = ProtocolState::default();

    let signature = header_str(headers, "signature");
    let signature_input = header_str(headers, "signature-input");

    if let (Some(_), Some(input)) = (signature, signature_input) {
        state.signature_present = true;

        if input.contains("sig1=") {
            state.signature_id = Some("sig1".to_string());
        }
        if input.contains("ecdsa") {
            state.signature_algorithm = Some("ecdsa-p256-sha256".to_string());
        } else if input.contains("secp256k1") {
            state.signature_algorithm = Some("secp256k1".to_string());
        }
    }

    if !raw_body.is_empty() {
        if let Ok(Value::Object(body)) = serde_json::from_slice::<Value>(raw_body) {
            if ENCRYPTED_PAYLOAD_FIELDS.iter().any(|f| body.contains_key(*f)) {
                state.encryption_present = true;
            }
            if let Some(tag) = body.get("type").and_then(Value::as_str) {
                if SECURE_TYPE_TAGS.contains(&tag) {
                    state.encryption_present = true;
                }
            }
        }
    }

    state
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

//! Bit-flip corruption of encrypted payloads.
//!
//! Field-level JSON edits cannot survive signature verification or
//! authenticated decryption downstream, so for sealed messages the only
//! demonstrable alteration is corrupting the ciphertext itself: a few
//! flipped bits break the integrity check on the receiving agent.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::Rng;
use serde_json::json;

use super::types::Change;
use crate::detect::ENCRYPTED_PAYLOAD_FIELDS;
use crate::message::{FieldExt, Message};

/// Apply the bit-flip to an independent copy of `original`.
///
/// Only the first populated field among the recognized encrypted-payload
/// names is corrupted. Returns `None` when no such field exists: unlike
/// the plain-text variants this is a distinguishable "nothing to attack"
/// outcome, and callers must pass the message through without an audit
/// event.
pub fn apply(original: &Message) -> Option<(Message, Vec<Change>)> {
    let (field, payload) = ENCRYPTED_PAYLOAD_FIELDS.iter().find_map(|field| {
        original
            .get_str(field)
            .filter(|p| !p.is_empty())
            .map(|p| (*field, p))
    })?;

    let corrupted = bit_flip_payload(payload);

    let mut modified = original.clone();
    modified.insert(field.to_string(), json!(corrupted));

    let changes = vec![Change::new(
        field,
        json!(format!("<{} bytes>", payload.len())),
        json!(format!("<{} bytes, bit-flipped>", corrupted.len())),
    )];

    Some((modified, changes))
}

/// Flip 3-5 random bits in the payload. Base64 input is decoded, flipped,
/// and re-encoded; anything else is treated as an opaque byte string
/// (invalid UTF-8 after flipping is replaced lossily).
fn bit_flip_payload(payload: &str) -> String {
    match BASE64.decode(payload) {
        Ok(mut bytes) => {
            flip_random_bits(&mut bytes);
            BASE64.encode(bytes)
        }
        Err(_) => {
            let mut bytes = payload.as_bytes().to_vec();
            flip_random_bits(&mut bytes);
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }
}

fn flip_random_bits(bytes: &mut [u8]) {
    if bytes.is_empty() {
        return;
    }

    // ThreadRng is a CSPRNG, per the integrity-corruption contract.
    let mut rng = rand::thread_rng();
    let flips = rng.gen_range(3..=5);
    for _ in 0..flips {
        let byte = rng.gen_range(0..bytes.len());
        let bit = rng.gen_range(0..8u8);
        bytes[byte] ^= 1 << bit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::codec::decode;

    fn sealed(field: &str, payload: &str) -> Message {
        let raw = format!(r#"{{"{field}":"{payload}","type":"secure"}}"#);
        decode(raw.as_bytes()).unwrap()
    }

    #[test]
    fn corrupts_base64_payload_preserving_length() {
        let plain = b"encrypted secret data with enough bytes";
        let encoded = BASE64.encode(plain);
        let original = sealed("encryptedPayload", &encoded);

        let (modified, changes) = apply(&original).unwrap();
        let corrupted = modified.get_str("encryptedPayload").unwrap();

        assert_ne!(corrupted, encoded);
        let decoded = BASE64.decode(corrupted).unwrap();
        assert_eq!(decoded.len(), plain.len());
        assert_ne!(decoded.as_slice(), plain);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "encryptedPayload");
    }

    #[test]
    fn first_populated_field_wins() {
        let encoded = BASE64.encode(b"some ciphertext bytes here");
        let raw = format!(
            r#"{{"encryptedPayload":"","ciphertext":"{encoded}","enc_data":"{encoded}"}}"#
        );
        let original = decode(raw.as_bytes()).unwrap();

        let (modified, changes) = apply(&original).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "ciphertext");
        // the later alternate is left alone
        assert_eq!(modified.get_str("enc_data"), Some(encoded.as_str()));
    }

    #[test]
    fn non_base64_payload_is_still_corrupted() {
        let original = sealed("enc_data", "definitely_not_base64_!!!");
        let (modified, _) = apply(&original).unwrap();
        assert_ne!(
            modified.get_str("enc_data"),
            Some("definitely_not_base64_!!!")
        );
    }

    #[test]
    fn absent_payload_is_a_distinguishable_no_op() {
        let original = decode(br#"{"amount":100,"recipient":"0xAA"}"#).unwrap();
        assert!(apply(&original).is_none());
    }

    #[test]
    fn input_message_is_never_mutated() {
        let encoded = BASE64.encode(b"payload");
        let original = sealed("ciphertext", &encoded);
        let snapshot = original.clone();
        let _ = apply(&original);
        assert_eq!(original, snapshot);
    }
}

//! Decode, encode, and single-read body tee.

use axum::body::Body;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

use super::Message;

/// Upper bound on buffered request bodies.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Errors produced while decoding an inbound body.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read request body: {0}")]
    Read(#[from] axum::Error),

    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body is not a JSON object")]
    NotAnObject,
}

/// Decode raw bytes into a message envelope.
pub fn decode(raw: &[u8]) -> Result<Message, CodecError> {
    let value: Value = serde_json::from_slice(raw)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CodecError::NotAnObject),
    }
}

/// Re-serialize a message to bytes.
pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(message).map_err(CodecError::Json)
}

/// Drain a single-read body exactly once, returning the raw bytes
/// alongside the decode attempt. A decode failure still yields the raw
/// bytes, so the caller can decide whether a pass-through forward is
/// acceptable.
pub async fn tee(body: Body) -> Result<(Bytes, Result<Message, CodecError>), CodecError> {
    let raw = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(CodecError::Read)?;
    let decoded = decode(&raw);
    Ok((raw, decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::FieldExt;

    #[test]
    fn decode_object() {
        let msg = decode(br#"{"amount":100,"recipient":"0xAA"}"#).unwrap();
        assert_eq!(msg.get_f64("amount"), Some(100.0));
        assert_eq!(msg.get_str("recipient"), Some("0xAA"));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        assert!(matches!(decode(b"{not json"), Err(CodecError::Json(_))));
    }

    #[test]
    fn decode_rejects_non_object() {
        assert!(matches!(decode(b"[1,2,3]"), Err(CodecError::NotAnObject)));
    }

    #[test]
    fn encode_preserves_key_order() {
        let raw = br#"{"z":1,"a":2,"m":3}"#;
        let msg = decode(raw).unwrap();
        assert_eq!(encode(&msg).unwrap(), raw.to_vec());
    }

    #[tokio::test]
    async fn tee_returns_raw_bytes_on_decode_failure() {
        let body = Body::from("not json at all");
        let (raw, decoded) = tee(body).await.unwrap();
        assert_eq!(&raw[..], b"not json at all");
        assert!(decoded.is_err());
    }

    #[test]
    fn accessors_return_none_for_absent_or_mistyped() {
        let msg = decode(br#"{"amount":"not a number"}"#).unwrap();
        assert_eq!(msg.get_f64("amount"), None);
        assert_eq!(msg.get_str("missing"), None);
        assert!(msg.get_object("amount").is_none());
    }
}

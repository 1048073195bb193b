//! Message envelope codec.
//!
//! # Responsibilities
//! - Decode a request body into an order-preserving key/value message
//! - Re-serialize a message back to bytes after transformation
//! - Drain a single-read body once while keeping the raw bytes available
//!   for both inspection and forwarding
//!
//! # Design Decisions
//! - Messages are `serde_json` object maps with `preserve_order`, so a
//!   pass-through forward re-serializes byte-compatibly
//! - Typed accessors return `None` for absent or mistyped fields instead
//!   of erroring; variant code never panics on message shape

pub mod codec;

pub use codec::{decode, encode, tee, CodecError, MAX_BODY_BYTES};

use serde_json::Value;

/// An ordered JSON object: the generic message envelope every request
/// carries. Owned by a single request for its lifetime.
pub type Message = serde_json::Map<String, Value>;

/// Typed field access that treats absence and wrong types uniformly.
pub trait FieldExt {
    /// String value of `key`, if present and a string.
    fn get_str(&self, key: &str) -> Option<&str>;

    /// Numeric value of `key`, if present and representable as f64.
    fn get_f64(&self, key: &str) -> Option<f64>;

    /// Nested object under `key`, if present and an object.
    fn get_object(&self, key: &str) -> Option<&Message>;
}

impl FieldExt for Message {
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    fn get_object(&self, key: &str) -> Option<&Message> {
        self.get(key).and_then(Value::as_object)
    }
}

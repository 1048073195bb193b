//! Message-transformation variants and selection.
//!
//! # Data Flow
//! ```text
//! ProtocolState + config ──▶ selector.rs (state machine)
//!                                 │
//!              ┌──────────────────┼────────────────────┐
//!              ▼                  ▼                    ▼
//!        price.rs /         encrypted.rs          pass-through
//!        address.rs /       (bit flip)
//!        product.rs
//! ```
//!
//! # Design Decisions
//! - Each variant is a pure function: `(message) -> (message', changes)`
//!   over an independent deep copy; inputs are never mutated
//! - A closed enum dispatched by the selector, not trait objects
//! - Absent target fields are a quiet no-op, never an error

pub mod address;
pub mod encrypted;
pub mod price;
pub mod product;
pub mod selector;
pub mod types;

pub use selector::{AttackDecision, AttackOutcome, Selector};
pub use types::{AttackRecord, AttackType, Change};

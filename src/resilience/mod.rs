//! Resilient outbound delivery.
//!
//! # Data Flow
//! ```text
//! Request to target agent:
//!     → transport.rs (materialize fresh request, bounded per-call timeout)
//!     → On failure or 5xx/429: backoff.rs (exponential delay + jitter)
//!     → retry until the attempt budget is spent
//! ```
//!
//! # Design Decisions
//! - The outbound body is an immutable buffer; every attempt builds an
//!   independent request from it (no single-use stream semantics)
//! - The per-call timeout is independent of backoff sleeps; total
//!   wall-clock time may exceed it across attempts
//! - On exhaustion the last response or error is returned unmodified

pub mod backoff;
pub mod transport;

pub use transport::{OutboundRequest, ResilientTransport, RetryPolicy, TransportError};

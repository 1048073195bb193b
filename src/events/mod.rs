//! Audit event broadcasting.
//!
//! # Data Flow
//! ```text
//! request handlers ── broadcast ──▶ hub.rs dispatch loop ──▶ per-observer
//!                                   (single task owns the     queues
//!                                    observer set)              │
//!                                                               ▼
//!                                                          stream.rs
//!                                                      (WebSocket pumps)
//! ```
//!
//! # Design Decisions
//! - All observer-set mutation is serialized through the dispatch loop
//!   (actor pattern); no locks on the hot path
//! - Broadcasting never blocks a request: full queues drop the event or
//!   evict the slow observer
//! - Each connection pumps its own queue with keep-alive pings

pub mod hub;
pub mod stream;

pub use hub::{EventHub, EventKind, EventLevel, LogEvent};

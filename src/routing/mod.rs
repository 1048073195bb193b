//! Destination resolution.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Resolution never fails; an unknown or absent destination falls back
//!   to the default endpoint
//! - Unknown names are a diagnostic signal, not an error

pub mod table;

pub use table::{Resolution, RouteTable};

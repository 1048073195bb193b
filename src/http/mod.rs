//! HTTP surface of the gateway.
//!
//! # Data Flow
//! ```text
//! POST /*  ─▶ handlers::forward ─▶ codec ─▶ detect ─▶ selector ─▶
//!             routing ─▶ resilient transport ─▶ response relay
//! GET /health, GET /status ─▶ reporting handlers (never enter the
//!                              attack pipeline)
//! GET /ws/logs ─▶ audit-stream upgrade
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};

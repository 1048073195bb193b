//! Intercepting gateway for agent-to-agent traffic.
//!
//! Sits between an agent client and one or more downstream agent services,
//! decodes each request envelope, classifies its transport-security state
//! (message signature, encrypted payload), applies a configured message
//! transformation, and forwards the result with retries. Every applied
//! transformation is broadcast to live WebSocket observers.
//!
//! Built for security demonstrations: it shows which message alterations
//! survive (or are caught by) signature verification and payload
//! encryption on the receiving agent.

pub mod attacks;
pub mod config;
pub mod detect;
pub mod events;
pub mod http;
pub mod message;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use events::EventHub;
pub use http::HttpServer;

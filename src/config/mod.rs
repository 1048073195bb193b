//! Gateway configuration.
//!
//! Loaded once at process start from environment variables, validated,
//! then treated as immutable input to every subsystem.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{AttackConfig, GatewayConfig, ObservabilityConfig, RouteConfig, ServerConfig};

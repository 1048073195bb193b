//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Honor the configured log level, overridable via `RUST_LOG`
//!
//! # Design Decisions
//! - Compact single-line format; the WebSocket audit stream carries the
//!   structured event feed, stdout logs are for operators

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level so a deployment
/// can be re-leveled without touching gateway configuration.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(normalize_level(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Map the configured level onto the known set. An unrecognized value
/// falls back to `info`; passing it through unchecked would let EnvFilter
/// parse it as a target directive and silence general logging.
fn normalize_level(configured: &str) -> &'static str {
    match configured.to_ascii_lowercase().as_str() {
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_pass_through() {
        for level in ["debug", "info", "warn", "error"] {
            assert_eq!(normalize_level(level), level);
        }
        assert_eq!(normalize_level("WARN"), "warn");
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        for bogus in ["verbose", "trace,hyper=off", ""] {
            assert_eq!(normalize_level(bogus), "info");
            let filter = EnvFilter::new(normalize_level(bogus));
            assert_eq!(filter.to_string(), EnvFilter::new("info").to_string());
        }
    }
}

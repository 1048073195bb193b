//! Configuration loading from environment variables.
//!
//! Parse failures on numeric/boolean variables fall back to defaults;
//! structural problems (unknown attack type, invalid URLs) fail startup
//! through validation.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::attacks::AttackType;
use crate::config::schema::{
    AttackConfig, GatewayConfig, ObservabilityConfig, RouteConfig, ServerConfig,
};
use crate::config::validation::validate;
use crate::resilience::RetryPolicy;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid ATTACK_TYPE \"{0}\" (valid: none, price_manipulation, address_manipulation, product_substitution)")]
    InvalidAttackType(String),

    #[error("configuration validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

impl GatewayConfig {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<GatewayConfig, ConfigError> {
        let attack_type_name = get_env("ATTACK_TYPE", "price_manipulation");
        let attack_type = AttackType::from_config_name(&attack_type_name)
            .ok_or(ConfigError::InvalidAttackType(attack_type_name))?;

        let config = GatewayConfig {
            server: ServerConfig {
                port: get_env("GATEWAY_PORT", "8090"),
                log_level: get_env("LOG_LEVEL", "info"),
            },
            attack: AttackConfig {
                enabled: get_env_bool("ATTACK_ENABLED", true),
                attack_type,
                price_multiplier: get_env_f64("PRICE_MULTIPLIER", 100.0),
                attacker_wallet: get_env("ATTACKER_WALLET", "0xATTACKER_WALLET_ADDRESS"),
            },
            routes: RouteConfig {
                agents: parse_agent_urls(env::var("AGENT_URLS").ok().as_deref()),
                default_url: get_env("TARGET_AGENT_URL", "http://localhost:8091"),
            },
            retry: RetryPolicy {
                max_retries: get_env_u64("MAX_RETRIES", 3) as u32,
                base_backoff_ms: get_env_u64("RETRY_BACKOFF_BASE", 100),
                timeout: Duration::from_secs(get_env_u64("HTTP_TIMEOUT", 30)),
            },
            observability: ObservabilityConfig {
                metrics_enabled: get_env_bool("METRICS_ENABLED", false),
                metrics_address: get_env("METRICS_ADDRESS", "0.0.0.0:9091"),
            },
        };

        validate(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

/// Parse the `AGENT_URLS` JSON object. Malformed input logs an error and
/// falls back to the default table rather than failing startup.
pub fn parse_agent_urls(raw: Option<&str>) -> HashMap<String, String> {
    let defaults = RouteConfig::default().agents;

    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return defaults;
    };

    match serde_json::from_str::<HashMap<String, String>>(raw) {
        Ok(agents) => agents,
        Err(e) => {
            tracing::error!(error = %e, "failed to parse AGENT_URLS, using default routes");
            defaults
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

fn get_env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

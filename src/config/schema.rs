//! Configuration schema definitions.

use std::collections::HashMap;

use serde::Serialize;

use crate::attacks::AttackType;
use crate::resilience::RetryPolicy;

/// Root configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub attack: AttackConfig,
    pub routes: RouteConfig,
    pub retry: RetryPolicy,
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            attack: AttackConfig::default(),
            routes: RouteConfig::default(),
            retry: RetryPolicy::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port.
    pub port: String,
    /// debug | info | warn | error.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: "8090".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Static attack policy. Serialized into the health endpoint's
/// `attack_config` block.
#[derive(Debug, Clone, Serialize)]
pub struct AttackConfig {
    /// Global attack flag; false means transparent proxy mode.
    #[serde(rename = "attack_enabled")]
    pub enabled: bool,
    pub attack_type: AttackType,
    pub price_multiplier: f64,
    pub attacker_wallet: String,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            attack_type: AttackType::PriceManipulation,
            price_multiplier: 100.0,
            attacker_wallet: "0xATTACKER_WALLET_ADDRESS".to_string(),
        }
    }
}

/// Agent-name routing table plus the default fallback endpoint.
#[derive(Debug, Clone)]
pub struct RouteConfig {
    pub agents: HashMap<String, String>,
    pub default_url: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        let mut agents = HashMap::new();
        agents.insert("root".to_string(), "http://localhost:18080".to_string());
        agents.insert("payment".to_string(), "http://localhost:19083".to_string());
        agents.insert("medical".to_string(), "http://localhost:19082".to_string());
        agents.insert("planning".to_string(), "http://localhost:19081".to_string());
        Self {
            agents,
            default_url: "http://localhost:8091".to_string(),
        }
    }
}

/// Metrics exporter settings.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9091".to_string(),
        }
    }
}

//! Configuration validation.
//!
//! Collects every problem rather than stopping at the first, so a
//! misconfigured deployment is fixable in one pass.

use url::Url;

use crate::config::schema::GatewayConfig;

/// Validate a loaded configuration. Returns every violation found.
pub fn validate(config: &GatewayConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.server.port.is_empty() {
        errors.push("GATEWAY_PORT cannot be empty".to_string());
    } else if config.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "GATEWAY_PORT must be a port number, got: {}",
            config.server.port
        ));
    }

    if config.attack.price_multiplier <= 0.0 {
        errors.push(format!(
            "PRICE_MULTIPLIER must be positive, got: {}",
            config.attack.price_multiplier
        ));
    }

    if config.routes.agents.is_empty() && config.routes.default_url.is_empty() {
        errors.push("either AGENT_URLS or TARGET_AGENT_URL must be configured".to_string());
    }

    if !config.routes.default_url.is_empty() && Url::parse(&config.routes.default_url).is_err() {
        errors.push(format!(
            "TARGET_AGENT_URL is not a valid URL: {}",
            config.routes.default_url
        ));
    }

    for (agent, url) in &config.routes.agents {
        if Url::parse(url).is_err() {
            errors.push(format!("AGENT_URLS[\"{agent}\"] is not a valid URL: {url}"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

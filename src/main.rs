//! Agent gateway entry point.
//!
//! Loads configuration from the environment, wires up logging, metrics,
//! and the event hub, then serves the interception proxy.

use tokio::net::TcpListener;

use agent_gateway::config::GatewayConfig;
use agent_gateway::events::EventHub;
use agent_gateway::http::HttpServer;
use agent_gateway::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env()?;

    logging::init(&config.server.log_level);

    tracing::info!("agent-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    if config.attack.enabled {
        tracing::warn!(
            attack_type = config.attack.attack_type.name(),
            price_multiplier = config.attack.price_multiplier,
            attacker_wallet = %config.attack.attacker_wallet,
            "ATTACK MODE ENABLED: intercepted messages will be modified"
        );
    } else {
        tracing::info!("attack mode disabled, acting as a transparent proxy");
    }

    tracing::info!(
        default_target = %config.routes.default_url,
        agents = config.routes.agents.len(),
        max_retries = config.retry.max_retries,
        timeout_secs = config.retry.timeout.as_secs(),
        "configuration loaded"
    );
    for (agent, url) in &config.routes.agents {
        tracing::info!(agent = %agent, url = %url, "route registered");
    }

    if let Err(e) = metrics::init(&config.observability) {
        tracing::error!(error = %e, "metrics exporter failed to start, continuing without it");
    }

    let hub = EventHub::spawn();

    let address = format!("0.0.0.0:{}", config.server.port);
    let listener = TcpListener::bind(&address).await?;

    let server = HttpServer::new(config, hub);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}

//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router: forwarding paths, health/status, log stream
//! - Share immutable subsystems with handlers through `AppState`
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - No inbound timeout layer: a request's wall-clock budget is governed
//!   by the outbound per-attempt timeout times the retry count
//! - Non-POST methods on forwarding paths are rejected by the router

use std::sync::Arc;

use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::attacks::Selector;
use crate::config::GatewayConfig;
use crate::events::EventHub;
use crate::http::handlers;
use crate::resilience::ResilientTransport;
use crate::routing::RouteTable;

/// Application state injected into handlers. Everything here is either
/// immutable or internally synchronized.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub selector: Arc<Selector>,
    pub routes: Arc<RouteTable>,
    pub transport: Arc<ResilientTransport>,
    pub hub: EventHub,
}

/// The gateway's HTTP server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Wire up subsystems from the given configuration.
    pub fn new(config: GatewayConfig, hub: EventHub) -> Self {
        let selector = Arc::new(Selector::from_config(&config.attack));
        let routes = Arc::new(RouteTable::new(
            config.routes.agents.clone(),
            config.routes.default_url.clone(),
        ));
        let transport = Arc::new(ResilientTransport::new(config.retry.clone()));

        let state = AppState {
            config: Arc::new(config),
            selector,
            routes,
            transport,
            hub,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/status", get(handlers::status))
            .route("/ws/logs", get(handlers::ws_logs))
            .route("/", any(handlers::forward))
            .route("/{*path}", any(handlers::forward))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on the given listener until shutdown.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("gateway server stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("shutdown signal received");
}

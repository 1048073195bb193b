//! Shared utilities for integration testing.
#![allow(dead_code)] // not every test binary uses every helper

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;

use agent_gateway::config::GatewayConfig;
use agent_gateway::events::EventHub;
use agent_gateway::http::HttpServer;

/// One request as seen by a mock agent.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub body: Bytes,
}

/// A mock target agent that captures every request it receives and
/// answers from a status script.
#[derive(Clone)]
pub struct MockAgent {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    script: Arc<Mutex<Vec<u16>>>,
    fallback_status: u16,
}

impl MockAgent {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn next_status(&self) -> u16 {
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            self.fallback_status
        } else {
            script.remove(0)
        }
    }
}

async fn capture(
    State(agent): State<MockAgent>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, &'static str) {
    agent.requests.lock().unwrap().push(CapturedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        body,
    });
    let status = StatusCode::from_u16(agent.next_status()).unwrap();
    (status, "agent-response")
}

/// Start a mock agent that always answers with `status`.
pub async fn start_mock_agent(status: u16) -> (SocketAddr, MockAgent) {
    start_scripted_agent(Vec::new(), status).await
}

/// Start a mock agent answering the nth request with `script[n]`, then
/// `fallback_status` once the script is exhausted.
pub async fn start_scripted_agent(script: Vec<u16>, fallback_status: u16) -> (SocketAddr, MockAgent) {
    let agent = MockAgent {
        requests: Arc::new(Mutex::new(Vec::new())),
        script: Arc::new(Mutex::new(script)),
        fallback_status,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .fallback(capture)
        .with_state(agent.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, agent)
}

/// Start a gateway on an ephemeral port with its own event hub.
pub async fn start_gateway(config: GatewayConfig) -> SocketAddr {
    let (addr, _hub) = start_gateway_with_hub(config).await;
    addr
}

/// Start a gateway on an ephemeral port, returning a handle to its event
/// hub for audit-stream assertions.
pub async fn start_gateway_with_hub(config: GatewayConfig) -> (SocketAddr, EventHub) {
    let hub = EventHub::spawn();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, hub.clone());
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (addr, hub)
}

/// A config with no attack, one named agent, and fast retries.
pub fn test_config(agent: &str, agent_addr: SocketAddr, default_addr: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.attack.enabled = false;
    config.routes.agents.clear();
    config
        .routes
        .agents
        .insert(agent.to_string(), format!("http://{agent_addr}"));
    config.routes.default_url = format!("http://{default_addr}");
    config.retry.max_retries = 2;
    config.retry.base_backoff_ms = 10;
    config
}

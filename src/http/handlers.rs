//! Request handlers.
//!
//! `forward` is the interception pipeline; `health`/`status` report
//! gateway state without touching it; `ws_logs` upgrades audit-stream
//! observers.

use std::time::Instant;

use axum::body::Body;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::attacks::AttackRecord;
use crate::detect::{self, ProtocolState};
use crate::events::stream;
use crate::http::server::AppState;
use crate::message::codec;
use crate::observability::metrics;
use crate::resilience::OutboundRequest;
use crate::routing::Resolution;

/// The interception pipeline: decode, classify, transform, route,
/// deliver, relay.
pub async fn forward(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = Uuid::new_v4();

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path_and_query,
        "incoming request"
    );

    if method != Method::POST {
        tracing::warn!(request_id = %request_id, method = %method, "method not allowed");
        metrics::record_request(method.as_str(), 405, "none", start);
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            "Only POST requests are supported",
        )
            .into_response();
    }

    // single read of the inbound body; raw bytes feed both detection and
    // the pass-through forward
    let (raw_body, decoded) = match codec::tee(body).await {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "failed to read request body");
            metrics::record_request(method.as_str(), 400, "none", start);
            return (StatusCode::BAD_REQUEST, "Failed to process request").into_response();
        }
    };

    let message = match decoded {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "failed to decode request body");
            metrics::record_request(method.as_str(), 400, "none", start);
            return (StatusCode::BAD_REQUEST, "Failed to process request").into_response();
        }
    };

    let protocol = detect::detect(&parts.headers, &raw_body);
    log_protocol_state(request_id, &protocol);

    let resolution = state.routes.resolve(&message);
    let target_url = match &resolution {
        Resolution::Named { agent, url } => {
            tracing::info!(request_id = %request_id, agent = %agent, url = %url, "routing by destination");
            url.clone()
        }
        Resolution::UnknownAgent { agent, url } => {
            tracing::warn!(
                request_id = %request_id,
                agent = %agent,
                "unknown destination agent, falling back to default endpoint"
            );
            url.clone()
        }
        Resolution::Default { url } => {
            tracing::debug!(request_id = %request_id, url = %url, "no destination field, using default endpoint");
            url.clone()
        }
    };

    let forward_body: Bytes = match state.selector.apply(&message, &protocol) {
        Some(outcome) => {
            warn_downstream_rejection(request_id, &protocol);

            let record = AttackRecord {
                timestamp: Utc::now(),
                attack_type: outcome.attack_type,
                original_message: message,
                modified_message: outcome.modified,
                changes: outcome.changes,
                target_endpoint: target_url.clone(),
            };
            tracing::warn!(
                request_id = %request_id,
                attack = %record.attack_type,
                changes = record.changes.len(),
                target = %record.target_endpoint,
                "attack applied"
            );
            state.hub.emit_attack(&record);
            metrics::record_attack(record.attack_type.name());

            match codec::encode(&record.modified_message) {
                Ok(bytes) => Bytes::from(bytes),
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "failed to encode modified message");
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                        .into_response();
                }
            }
        }
        // untouched: forward the raw bytes so the body stays
        // byte-identical
        None => raw_body,
    };

    let uri = format!("{}{}", target_url.trim_end_matches('/'), path_and_query);
    let outbound = OutboundRequest::new(method.clone(), uri, &parts.headers, forward_body);

    tracing::info!(request_id = %request_id, uri = %outbound.uri(), "forwarding request");

    match state.transport.deliver(&outbound).await {
        Ok(response) => {
            let status = response.status();
            tracing::info!(request_id = %request_id, status = %status, "response from target agent");
            metrics::record_request(method.as_str(), status.as_u16(), &target_url, start);

            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "failed to reach target agent");
            metrics::record_request(method.as_str(), 502, &target_url, start);
            (StatusCode::BAD_GATEWAY, "Failed to reach target agent").into_response()
        }
    }
}

fn log_protocol_state(request_id: Uuid, protocol: &ProtocolState) {
    if protocol.signature_present {
        tracing::info!(
            request_id = %request_id,
            signature_id = protocol.signature_id.as_deref().unwrap_or(""),
            algorithm = protocol.signature_algorithm.as_deref().unwrap_or(""),
            "message signature detected"
        );
    } else {
        tracing::warn!(request_id = %request_id, "no message signature present");
    }
    if protocol.encryption_present {
        tracing::info!(request_id = %request_id, "encrypted payload detected");
    }
}

/// The target agent will reject a tampered message whenever a security
/// layer is present; say so up front.
fn warn_downstream_rejection(request_id: Uuid, protocol: &ProtocolState) {
    match (protocol.signature_present, protocol.encryption_present) {
        (true, true) => tracing::warn!(
            request_id = %request_id,
            "target agent will reject this request: signature verification and decryption will both fail"
        ),
        (true, false) => tracing::warn!(
            request_id = %request_id,
            "target agent will reject this request: signature verification will fail"
        ),
        (false, true) => tracing::warn!(
            request_id = %request_id,
            "target agent will fail to decrypt this message: payload integrity broken"
        ),
        (false, false) => {}
    }
}

/// Health report including the active attack policy.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "attack_config": {
            "attack_enabled": state.config.attack.enabled,
            "attack_type": state.config.attack.attack_type.name(),
            "target_url": state.routes.default_url(),
            "price_multiplier": state.config.attack.price_multiplier,
            "attacker_wallet": state.config.attack.attacker_wallet,
        },
        "observers": state.hub.observer_count(),
    }))
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub attack_detected: bool,
    pub attack_type: String,
}

/// Compact status used by demo dashboards.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        attack_detected: state.config.attack.enabled,
        attack_type: state.config.attack.attack_type.name().to_string(),
    })
}

/// Upgrade an audit-stream observer connection.
pub async fn ws_logs(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| stream::serve(hub, socket))
}

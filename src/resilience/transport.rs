//! Outbound delivery with bounded retry.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, Response, StatusCode};
use bytes::Bytes;
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use super::backoff::calculate_backoff;

/// Retry parameters, loaded once at startup and shared read-only by every
/// request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 means a single attempt.
    pub max_retries: u32,
    /// Base for the exponential backoff, in milliseconds.
    pub base_backoff_ms: u64,
    /// Per-attempt deadline, independent of backoff sleeps.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_backoff_ms: 100,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Delivery failed on every allowed attempt; the last error is carried
/// unmodified.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {uri} timed out after {timeout:?}")]
    Timeout { uri: String, timeout: Duration },

    #[error("request to {uri} failed: {source}")]
    Connect {
        uri: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("invalid outbound request: {0}")]
    InvalidRequest(#[from] axum::http::Error),
}

/// Immutable description of one outbound delivery. A fresh request is
/// materialized from it for every attempt, so the body never has
/// single-use semantics.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
}

impl OutboundRequest {
    /// Capture an outbound request. Inbound headers are carried verbatim
    /// except `content-length` (recomputed from the body) and `host`
    /// (derived from the target URI).
    pub fn new(method: Method, uri: impl Into<String>, headers: &HeaderMap, body: Bytes) -> Self {
        let mut headers = headers.clone();
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::HOST);
        Self {
            method,
            uri: uri.into(),
            headers,
            body,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn materialize(&self) -> Result<Request<Body>, TransportError> {
        let mut request = Request::builder()
            .method(self.method.clone())
            .uri(self.uri.as_str())
            .body(Body::from(self.body.clone()))?;
        *request.headers_mut() = self.headers.clone();
        Ok(request)
    }
}

/// HTTP delivery with bounded retry and jittered exponential backoff.
pub struct ResilientTransport {
    client: Client<HttpConnector, Body>,
    policy: RetryPolicy,
}

impl ResilientTransport {
    pub fn new(policy: RetryPolicy) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Deliver with up to `max_retries` additional attempts. A response
    /// below 500 (other than 429) is accepted immediately; 5xx and 429
    /// responses and transport-level errors are retried. On exhaustion
    /// the final response (if any) or the final error is returned as-is.
    pub async fn deliver(
        &self,
        outbound: &OutboundRequest,
    ) -> Result<Response<Incoming>, TransportError> {
        let max_retries = self.policy.max_retries;
        let mut attempt: u32 = 0;

        loop {
            let request = outbound.materialize()?;
            let result = tokio::time::timeout(self.policy.timeout, self.client.request(request)).await;

            let error = match result {
                Ok(Ok(response)) => {
                    let status = response.status();
                    if !is_retryable_status(status) {
                        if attempt > 0 {
                            tracing::info!(
                                uri = %outbound.uri,
                                attempts = attempt + 1,
                                "request succeeded after retry"
                            );
                        }
                        return Ok(response);
                    }
                    if attempt == max_retries {
                        tracing::error!(
                            uri = %outbound.uri,
                            status = %status,
                            attempts = attempt + 1,
                            "request failed on every attempt"
                        );
                        return Ok(response);
                    }
                    tracing::warn!(
                        uri = %outbound.uri,
                        status = %status,
                        attempt = attempt + 1,
                        max_attempts = max_retries + 1,
                        "retryable response"
                    );
                    None
                }
                Ok(Err(source)) => Some(TransportError::Connect {
                    uri: outbound.uri.clone(),
                    source,
                }),
                Err(_) => Some(TransportError::Timeout {
                    uri: outbound.uri.clone(),
                    timeout: self.policy.timeout,
                }),
            };

            if let Some(error) = error {
                if attempt == max_retries {
                    tracing::error!(
                        uri = %outbound.uri,
                        error = %error,
                        attempts = attempt + 1,
                        "request failed on every attempt"
                    );
                    return Err(error);
                }
                tracing::warn!(
                    uri = %outbound.uri,
                    error = %error,
                    attempt = attempt + 1,
                    max_attempts = max_retries + 1,
                    "retryable transport error"
                );
            }

            let delay = calculate_backoff(attempt, self.policy.base_backoff_ms);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// 5xx and 429 are retryable; every other status is final.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

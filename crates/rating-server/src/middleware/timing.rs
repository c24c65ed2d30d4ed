//! Request logging.

use std::time::{Duration, Instant};

use axum::{body::Body, http::Request, middleware::Next, response::Response};

/// Requests slower than this are logged at `warn`.
pub const SLOW_REQUEST: Duration = Duration::from_millis(100);

/// Logs method, path, status and latency of every request.
///
/// Health checks are logged at `trace`.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    let elapsed_ms = elapsed.as_millis() as u64;

    if elapsed > SLOW_REQUEST {
        tracing::warn!(%method, %path, status, elapsed_ms, "slow request");
    } else if path == "/health" {
        tracing::trace!(%method, %path, status, elapsed_ms, "health check");
    } else if response.status().is_server_error() {
        tracing::error!(%method, %path, status, elapsed_ms, "request failed");
    } else {
        tracing::debug!(%method, %path, status, elapsed_ms, "request completed");
    }

    response
}

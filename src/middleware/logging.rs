//! Request logging middleware.
//!
//! Logs every HTTP request with method, path, status code, caller and latency.

use crate::auth::middleware::Identity;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Logs at INFO for completed requests, WARN for 5xx. Health checks are
/// skipped. The caller id is read from the `Identity` set by the
/// authentication middleware, so this layer must wrap it.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == "/health" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let (response, user_id) = run_with_caller(request, next).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if status >= 500 {
        warn!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            user_id,
            "Request failed (5xx)"
        );
    } else if status >= 400 {
        info!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            user_id,
            "Request completed (4xx)"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            user_id,
            "Request completed"
        );
    }

    response
}

/// Run the rest of the stack; the identity is only known after the inner
/// middleware ran, so it travels back on the response extensions.
async fn run_with_caller(request: Request, next: Next) -> (Response, Option<i64>) {
    let response = next.run(request).await;
    let user_id = response
        .extensions()
        .get::<Identity>()
        .and_then(Identity::user)
        .map(|u| u.id);
    (response, user_id)
}

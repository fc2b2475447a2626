//! Request logging middleware
//!
//! One structured line per request with method, path, status and latency.
//! Slow requests and server errors are raised to `warn`/`error`. Every
//! response carries an `x-request-id`, taken from the request when present.

use std::time::{Duration, Instant};
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, error, info, warn, Instrument};
use crate::utils::helpers::generate_uuid;

/// Requests slower than this are logged as warnings
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(1);

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Log level chosen for a finished request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestLogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Health probes stay at debug; 5xx is an error; slow or 4xx is a warning
pub fn classify(path: &str, status: u16, elapsed: Duration) -> RequestLogLevel {
    if status >= 500 {
        RequestLogLevel::Error
    } else if elapsed > SLOW_REQUEST_THRESHOLD || (400..500).contains(&status) && status != 404 {
        RequestLogLevel::Warn
    } else if path == "/healthz" {
        RequestLogLevel::Debug
    } else {
        RequestLogLevel::Info
    }
}

/// Client-supplied id when it is short printable ASCII, otherwise a fresh UUID
fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= 64)
        .map(str::to_string)
        .unwrap_or_else(generate_uuid)
}

/// `axum::middleware::from_fn` entry point
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(&request);
    let started = Instant::now();

    let span = tracing::info_span!("request", request_id = %request_id);
    let mut response = next.run(request).instrument(span).await;

    let elapsed = started.elapsed();
    let status = response.status().as_u16();
    let duration_ms = elapsed.as_millis() as u64;

    match classify(&path, status, elapsed) {
        RequestLogLevel::Error => error!(request_id = %request_id, method = %method, path = %path, status = status, duration_ms = duration_ms, "Request failed"),
        RequestLogLevel::Warn if elapsed > SLOW_REQUEST_THRESHOLD => {
            warn!(request_id = %request_id, method = %method, path = %path, status = status, duration_ms = duration_ms, "Slow request")
        }
        RequestLogLevel::Warn => warn!(request_id = %request_id, method = %method, path = %path, status = status, duration_ms = duration_ms, "Request rejected"),
        RequestLogLevel::Info => info!(request_id = %request_id, method = %method, path = %path, status = status, duration_ms = duration_ms, "Request completed"),
        RequestLogLevel::Debug => debug!(request_id = %request_id, method = %method, path = %path, status = status, duration_ms = duration_ms, "Request completed"),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    response
}

//! Rate limiting middleware
//!
//! Sliding one-minute window per client with a small burst allowance on top.
//! Clients are keyed by the user id in their bearer token, or by peer address
//! for anonymous requests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};
use crate::config::settings::LimitsConfig;
use crate::handlers::AppState;
use crate::middleware::auth::bearer_token;
use crate::utils::errors::ClubHubError;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    pub window_duration: Duration,
    /// Extra requests allowed once the window is full
    pub burst_allowance: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 120,
            window_duration: Duration::from_secs(60),
            burst_allowance: 20,
        }
    }
}

impl From<&LimitsConfig> for RateLimitConfig {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            max_requests: limits.rate_limit_per_minute,
            window_duration: Duration::from_secs(60),
            burst_allowance: limits.rate_limit_burst,
        }
    }
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    requests: Vec<Instant>,
    burst_used: u32,
    last_reset: Instant,
}

impl RateLimitEntry {
    fn new(now: Instant) -> Self {
        Self {
            requests: Vec::new(),
            burst_used: 0,
            last_reset: now,
        }
    }

    fn cleanup(&mut self, now: Instant, window: Duration) {
        self.requests.retain(|&time| now.duration_since(time) < window);

        if now.duration_since(self.last_reset) >= window {
            self.burst_used = 0;
            self.last_reset = now;
        }
    }

    fn try_acquire(&mut self, now: Instant, config: &RateLimitConfig) -> bool {
        self.cleanup(now, config.window_duration);

        if (self.requests.len() as u32) < config.max_requests {
            self.requests.push(now);
            return true;
        }
        if self.burst_used < config.burst_allowance {
            self.burst_used += 1;
            self.requests.push(now);
            return true;
        }
        false
    }

    fn is_idle(&self, now: Instant, window: Duration) -> bool {
        self.requests.iter().all(|&t| now.duration_since(t) >= window)
    }
}

/// Shared in-memory limiter
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a request for `key`; false when the client is over its limit
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries();
        entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry::new(now))
            .try_acquire(now, &self.config)
    }

    /// Drop clients with no requests inside the window
    pub fn cleanup_old_entries(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_idle(now, self.config.window_duration));
        before - entries.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.entries().len()
    }
}

/// Pick the limiter key for a request
fn client_key(request: &Request, state: &AppState) -> String {
    if let Some(claims) = bearer_token(request.headers()).and_then(|t| state.services.auth.decode_token(t).ok()) {
        return format!("user:{}", claims.sub);
    }

    match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("ip:{}", addr.ip()),
        None => "anonymous".to_string(),
    }
}

/// `axum::middleware::from_fn_with_state` entry point
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_key(&request, &state);

    if !state.rate_limiter.check(&key) {
        warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        return ClubHubError::RateLimitExceeded.into_response();
    }

    debug!(client = %key, "Rate limit check passed");
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, burst_allowance: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window_duration: Duration::from_secs(60),
            burst_allowance,
        })
    }

    #[test]
    fn test_rate_limit_basic() {
        let limiter = limiter(3, 0);
        let now = Instant::now();
        assert!(limiter.check_at("user:1", now));
        assert!(limiter.check_at("user:1", now));
        assert!(limiter.check_at("user:1", now));
        assert!(!limiter.check_at("user:1", now));
        assert!(limiter.check_at("user:2", now));
    }

    #[test]
    fn test_burst_allowance() {
        let limiter = limiter(2, 1);
        let now = Instant::now();
        assert!(limiter.check_at("ip:10.0.0.1", now));
        assert!(limiter.check_at("ip:10.0.0.1", now));
        assert!(limiter.check_at("ip:10.0.0.1", now));
        assert!(!limiter.check_at("ip:10.0.0.1", now));
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(1, 0);
        let start = Instant::now();
        assert!(limiter.check_at("user:1", start));
        assert!(!limiter.check_at("user:1", start + Duration::from_secs(30)));
        assert!(limiter.check_at("user:1", start + Duration::from_secs(61)));
    }

    #[test]
    fn test_config_from_limits() {
        let settings = crate::config::Settings::default();
        let config = RateLimitConfig::from(&settings.limits);
        assert_eq!(config.max_requests, 120);
        assert_eq!(config.burst_allowance, 20);
    }

    #[test]
    fn test_cleanup() {
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: 5,
            window_duration: Duration::from_millis(0),
            burst_allowance: 0,
        });
        limiter.check("user:1");
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.cleanup_old_entries(), 1);
        assert_eq!(limiter.tracked_clients(), 0);
    }

    proptest::proptest! {
        #[test]
        fn test_accepts_at_most_max_plus_burst(max in 1u32..50, burst in 0u32..10, attempts in 1usize..120) {
            let limiter = limiter(max, burst);
            let now = Instant::now();
            let accepted = (0..attempts).filter(|_| limiter.check_at("user:7", now)).count();
            proptest::prop_assert_eq!(accepted, attempts.min((max + burst) as usize));
        }
    }
}

//! Per-client rate limiting for the query and submission routes.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::LimitsConfig;
use crate::observability::metrics;

/// Message returned with 429 responses.
pub const RATE_LIMITED_MESSAGE: &str = "请求频率过高，已超出限制，请稍后重试。";

/// A simple token bucket.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_per_sec: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_per_sec).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Hourly quota per client IP; the whole quota may be spent as a burst.
pub struct RateLimiter {
    buckets: Mutex<HashMap<IpAddr, TokenBucket>>,
    route: &'static str,
    enabled: bool,
    capacity: f64,
    refill_per_sec: f64,
}

impl RateLimiter {
    /// Limiter for the query routes.
    pub fn new(config: &LimitsConfig) -> Self {
        Self::with_quota("query", config.enabled, config.query_per_hour)
    }

    /// Limiter for report submissions.
    pub fn submissions(config: &LimitsConfig) -> Self {
        Self::with_quota("submit", config.enabled, config.submit_per_hour)
    }

    fn with_quota(route: &'static str, enabled: bool, per_hour: u32) -> Self {
        let capacity = per_hour as f64;
        Self {
            buckets: Mutex::new(HashMap::new()),
            route,
            enabled,
            capacity,
            refill_per_sec: capacity / 3600.0,
        }
    }

    /// Take one request from `client`'s quota.
    pub fn check(&self, client: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let bucket = buckets
            .entry(client)
            .or_insert_with(|| TokenBucket::new(self.capacity));

        bucket.try_acquire(self.capacity, self.refill_per_sec)
    }
}

/// Middleware guarding the routes `limiter` is layered on.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check(addr.ip()) {
        return next.run(request).await;
    }

    tracing::warn!(client = %addr.ip(), path = %request.uri().path(), "Rate limit exceeded");
    metrics::record_rate_limited(limiter.route);
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "error": RATE_LIMITED_MESSAGE })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_per_client() {
        let limiter = RateLimiter::new(&LimitsConfig {
            enabled: true,
            query_per_hour: 2,
            ..Default::default()
        });
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a));
        assert!(limiter.check(a));
        assert!(!limiter.check(a));
        assert!(limiter.check(b));
    }

    #[test]
    fn test_disabled_limiter_allows_all() {
        let limiter = RateLimiter::new(&LimitsConfig {
            enabled: false,
            query_per_hour: 1,
            ..Default::default()
        });
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        for _ in 0..10 {
            assert!(limiter.check(a));
        }
    }

    #[test]
    fn test_submissions_use_their_own_quota() {
        let config = LimitsConfig {
            enabled: true,
            query_per_hour: 5,
            submit_per_hour: 1,
        };
        let submissions = RateLimiter::submissions(&config);
        let queries = RateLimiter::new(&config);
        let a: IpAddr = "10.0.0.1".parse().unwrap();

        assert!(submissions.check(a));
        assert!(!submissions.check(a));
        assert!(queries.check(a));
    }
}

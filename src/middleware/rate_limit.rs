use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};
use tracing::warn;

use crate::api::errors::ErrorResponse;

/// Fixed-window request counter keyed by client address.
#[derive(Clone)]
pub struct RateLimit {
    store: Arc<DashMap<String, RateLimitData>>,
    /// Unix seconds of the last sweep over expired windows.
    last_prune: Arc<AtomicI64>,
    max_requests: u32,
    window_seconds: i64,
}

#[derive(Debug, Clone)]
struct RateLimitData {
    count: u32,
    window_start: DateTime<Utc>,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            last_prune: Arc::new(AtomicI64::new(i64::MIN)),
            max_requests,
            window_seconds,
        }
    }

    /// Counts one request from `key` at `now`; `false` once the window is exhausted.
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.prune_expired(now);

        let mut entry = self
            .store
            .entry(key.to_string())
            .or_insert_with(|| RateLimitData {
                count: 0,
                window_start: now,
            });
        let data = entry.value_mut();

        if now.signed_duration_since(data.window_start) >= Duration::seconds(self.window_seconds) {
            data.count = 0;
            data.window_start = now;
        }

        data.count += 1;
        data.count <= self.max_requests
    }

    /// Number of clients currently holding a window.
    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    /// Drops clients whose window has ended. Runs at most once per window.
    fn prune_expired(&self, now: DateTime<Utc>) {
        let last = self.last_prune.load(Ordering::Acquire);
        if now.timestamp().saturating_sub(last) < self.window_seconds {
            return;
        }
        if self
            .last_prune
            .compare_exchange(last, now.timestamp(), Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let window = Duration::seconds(self.window_seconds);
        self.store
            .retain(|_, data| now.signed_duration_since(data.window_start) < window);
    }
}

/// IP-based rate limiting middleware. Requests served without connection
/// info (e.g. in-process tests) share the `unknown` bucket.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimit>,
    req: Request,
    next: Next,
) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !rate_limit.check(&ip, Utc::now()) {
        warn!(%ip, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "Rate limit exceeded".to_string(),
            }),
        )
            .into_response();
    }

    next.run(req).await
}

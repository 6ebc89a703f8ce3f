//! Fixed-window request limiter keyed by client IP.
//!
//! ```rust,ignore
//! let limiter = RateLimiter::from_config(&config.rate_limit);
//! let api = api.layer(axum::middleware::from_fn_with_state(limiter, rate_limit));
//! ```

use super::error::ErrorBody;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use dayqhi_domain::config::RateLimitConfig;
use moka::sync::Cache;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

const MAX_TRACKED_CLIENTS: u64 = 100_000;
const UNKNOWN_CLIENT: &str = "unknown";
const API_PREFIX: &str = "/api";

#[derive(Debug)]
struct Window {
    opened: Instant,
    hits: AtomicU32,
}

/// Cloneable limiter; clones share their counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    windows: Option<Cache<String, Arc<Window>>>,
    requests: u32,
    window: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(requests: u32, window: Duration) -> Self {
        let window = window.max(Duration::from_secs(1));
        let windows =
            Cache::builder().max_capacity(MAX_TRACKED_CLIENTS).time_to_live(window).build();
        Self { windows: Some(windows), requests, window }
    }

    /// A limiter that admits everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { windows: None, requests: 0, window: Duration::ZERO }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        if config.enabled {
            Self::new(config.requests, Duration::from_secs(config.window_seconds))
        } else {
            Self::disabled()
        }
    }

    /// Counts one request for `client`.
    ///
    /// # Errors
    /// Returns the time until the client's window resets once the budget is spent.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        let Some(windows) = &self.windows else {
            return Ok(());
        };

        let window = windows.get_with_by_ref(client, || {
            Arc::new(Window { opened: Instant::now(), hits: AtomicU32::new(0) })
        });

        let hits = window.hits.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        if hits <= self.requests {
            return Ok(());
        }

        Err(self.window.saturating_sub(window.opened.elapsed()))
    }
}

/// Axum middleware applying [`RateLimiter`] to the `/api` requests it wraps.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with(API_PREFIX) {
        return next.run(request).await;
    }

    let peer = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0.ip());
    let client = client_key(peer, request.headers());

    match limiter.check(&client) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            let seconds = retry_after.as_secs().max(1);
            debug!(client = %client, retry_after = seconds, "Rate limit exceeded");

            let mut response = ErrorBody::respond(
                StatusCode::TOO_MANY_REQUESTS,
                format!("Rate limit exceeded; retry in {seconds} seconds"),
            );
            response.headers_mut().insert(header::RETRY_AFTER, HeaderValue::from(seconds));
            response
        },
    }
}

/// Peer address first, then the first `X-Forwarded-For` hop, else a shared bucket.
fn client_key(peer: Option<IpAddr>, headers: &HeaderMap) -> String {
    if let Some(ip) = peer {
        return ip.to_string();
    }

    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .map_or_else(|| UNKNOWN_CLIENT.to_owned(), |ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_enforced_per_client() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.check("10.0.0.1").is_ok());
        assert!(limiter.check("10.0.0.1").is_ok());
        let retry = limiter.check("10.0.0.1").unwrap_err();
        assert!(retry <= Duration::from_secs(60));

        assert!(limiter.check("10.0.0.2").is_ok());
    }

    #[test]
    fn disabled_limiter_admits_everything() {
        let limiter = RateLimiter::from_config(&RateLimitConfig {
            enabled: false,
            requests: 0,
            window_seconds: 1,
        });
        for _ in 0..100 {
            assert!(limiter.check("10.0.0.1").is_ok());
        }
    }

    #[test]
    fn peer_address_wins_over_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.9, 10.0.0.1"));

        let peer = Some(IpAddr::from([127, 0, 0, 1]));
        assert_eq!(client_key(peer, &headers), "127.0.0.1");
        assert_eq!(client_key(None, &headers), "203.0.113.9");
        assert_eq!(client_key(None, &HeaderMap::new()), UNKNOWN_CLIENT);
    }
}

//! Fixed window request limit per client address for everything below `/api`

use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use dashmap::DashMap;
use tracing::{debug, warn};

use super::client_ip::ClientIp;
use crate::{routes::error, RestServerRateLimitConfig};

/// Number of tracked addresses above which expired windows are dropped.
const PRUNE_THRESHOLD: usize = 10_000;

pub fn add<S: Clone + Send + Sync + 'static>(
    limiter: Arc<RateLimiter>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| router.layer(from_fn_with_state(limiter, middleware))
}

async fn middleware(limiter: State<Arc<RateLimiter>>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path != "/api" && !path.starts_with("/api/") {
        return next.run(request).await;
    }

    let client_ip = request
        .extensions()
        .get::<ClientIp>()
        .map(|ip| ip.0)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    let decision = limiter.hit(client_ip, Instant::now());

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!(%client_ip, "rate limit exceeded");
        let mut response = error(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        );
        response
            .headers_mut()
            .insert("retry-after", HeaderValue::from(decision.reset_secs()));
        response
    };

    limiter.set_headers(response.headers_mut(), decision);
    response
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RestServerRateLimitConfig,
    windows: DashMap<IpAddr, Window>,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start: Instant,
    hits: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decision {
    allowed: bool,
    remaining: u64,
    reset: Duration,
}

impl Decision {
    /// Seconds until the window resets, rounded up.
    fn reset_secs(&self) -> u64 {
        self.reset.as_secs() + u64::from(self.reset.subsec_nanos() > 0)
    }
}

impl RateLimiter {
    pub fn new(config: RestServerRateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    /// Count a request from `ip` at `now`.
    ///
    /// A window opens with the first request from an address and lasts
    /// `config.window`. Within it, the first `config.max_requests` requests
    /// are allowed.
    fn hit(&self, ip: IpAddr, now: Instant) -> Decision {
        if self.windows.len() >= PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut window = self.windows.entry(ip).or_insert(Window {
            start: now,
            hits: 0,
        });
        if now.saturating_duration_since(window.start) >= self.config.window {
            *window = Window {
                start: now,
                hits: 0,
            };
        }
        window.hits = window.hits.saturating_add(1);

        Decision {
            allowed: window.hits <= self.config.max_requests,
            remaining: self.config.max_requests.saturating_sub(window.hits),
            reset: (window.start + self.config.window).saturating_duration_since(now),
        }
    }

    fn prune(&self, now: Instant) {
        let before = self.windows.len();
        self.windows
            .retain(|_, window| now.saturating_duration_since(window.start) < self.config.window);
        debug!(before, after = self.windows.len(), "pruned rate limit windows");
    }

    fn set_headers(&self, headers: &mut HeaderMap, decision: Decision) {
        let window_secs = self.config.window.as_secs();
        let policy = format!("{};w={window_secs}", self.config.max_requests);
        if let Ok(policy) = HeaderValue::try_from(policy) {
            headers.insert("ratelimit-policy", policy);
        }
        headers.insert("ratelimit-limit", HeaderValue::from(self.config.max_requests));
        headers.insert("ratelimit-remaining", HeaderValue::from(decision.remaining));
        headers.insert("ratelimit-reset", HeaderValue::from(decision.reset_secs()));
    }
}

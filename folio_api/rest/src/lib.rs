use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use folio_auth_contracts::AuthService;
use folio_core_contact_contracts::ContactFeatureService;
use folio_core_health_contracts::HealthFeatureService;
use middlewares::rate_limit::RateLimiter;
use tokio::net::TcpListener;
use tracing::info;

mod extractors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug)]
pub struct RestServer<Health, Contact, Auth> {
    config: RestServerConfig,
    rate_limiter: Arc<RateLimiter>,
    health: Health,
    contact: Contact,
    auth: Auth,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub addr: IpAddr,
    pub port: u16,
    /// Reported by the health endpoint. Request tracing is disabled in
    /// `production`.
    pub environment: String,
    /// Maximum size of a request body in bytes.
    pub body_limit: usize,
    /// Origins allowed to make cross-origin requests.
    pub allowed_origins: Vec<HeaderValue>,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
    pub rate_limit: RestServerRateLimitConfig,
}

#[derive(Debug)]
pub struct RestServerRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Clone, Copy)]
pub struct RestServerRateLimitConfig {
    pub window: Duration,
    pub max_requests: u64,
}

impl RestServerConfig {
    fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl<Health, Contact, Auth> RestServer<Health, Contact, Auth>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
    Auth: AuthService,
{
    pub fn new(config: RestServerConfig, health: Health, contact: Contact, auth: Auth) -> Self {
        Self {
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            config,
            health,
            contact,
            auth,
        }
    }

    /// Serve the api until `shutdown` completes, then wait for in-flight
    /// requests to finish.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let addr = (self.config.addr, self.config.port);
        let router = self.router();

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}:{}", addr.0, addr.1))?;
        info!("Listening on {}:{}", addr.0, addr.1);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .context("Failed to serve http requests")
    }

    pub fn router(self) -> Router<()> {
        let Self {
            config,
            rate_limiter,
            health,
            contact,
            auth,
        } = self;

        let router = Router::new()
            .merge(routes::health::router(
                health.into(),
                config.environment.as_str().into(),
            ))
            .merge(routes::contact::router(contact.into(), auth.into()))
            .fallback(routes::not_found)
            .method_not_allowed_fallback(routes::not_found);

        // innermost first
        let router = middlewares::panic_handler::add(router);
        let router = middlewares::rate_limit::add(rate_limiter)(router);
        let router = router.layer(DefaultBodyLimit::max(config.body_limit));
        let router = middlewares::cors::add(config.allowed_origins.clone())(router);
        let router = middlewares::security_headers::add(router);
        let router = if config.is_production() {
            router
        } else {
            middlewares::trace::add(router)
        };
        let router = middlewares::client_ip::add(config.real_ip_config.clone())(router);
        middlewares::request_id::add(router)
    }
}

//! Wiring of the concrete service implementations

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use folio_api_rest::{RestServerConfig, RestServerRateLimitConfig, RestServerRealIpConfig};
use folio_auth_impl::AuthServiceConfig;
use folio_config::Config;
use folio_core_health_impl::HealthFeatureConfig;
use types::{Auth, ContactFeature, ContactRepo, Database, HealthFeature, Id, RestServer, Time};

pub mod types;

/// Build the http server and every service behind it.
///
/// `database` is shared by all services and closed once the returned server
/// is dropped.
pub fn rest_server(config: &Config, database: Database) -> anyhow::Result<RestServer> {
    let time = Time::default();

    let health = HealthFeature::new(
        time,
        database.clone(),
        HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        },
    );
    let contact = ContactFeature::new(database, Id::default(), time, ContactRepo::default());
    let auth = Auth::new(auth_service_config(config));

    Ok(RestServer::new(
        rest_server_config(config)?,
        health,
        contact,
        auth,
    ))
}

pub fn rest_server_config(config: &Config) -> anyhow::Result<RestServerConfig> {
    let allowed_origins = config
        .http
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid cors origin {origin:?}"))
        })
        .collect::<anyhow::Result<_>>()?;

    Ok(RestServerConfig {
        addr: config.http.host,
        port: config.http.port,
        environment: config.environment.clone(),
        body_limit: config.http.body_limit,
        allowed_origins,
        real_ip_config: config.http.real_ip.as_ref().map(|real_ip_config| {
            Arc::new(RestServerRealIpConfig {
                header: real_ip_config.header.clone(),
                set_from: real_ip_config.set_from,
            })
        }),
        rate_limit: RestServerRateLimitConfig {
            window: config.rate_limit.window.into(),
            max_requests: config.rate_limit.max_requests,
        },
    })
}

fn auth_service_config(config: &Config) -> AuthServiceConfig {
    AuthServiceConfig {
        admin_secret: config.admin.secret.as_deref().map(Into::into),
    }
}

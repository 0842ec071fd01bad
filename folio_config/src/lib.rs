use std::{net::IpAddr, path::Path};

use anyhow::Context;
use config::{File, FileFormat};
use serde::Deserialize;

pub use duration::Duration;

mod duration;

/// The configuration shipped with the binary. Every key has a default here.
pub const DEFAULT_CONFIG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml"));

/// Colon-separated list of additional config files to layer on top of the
/// defaults.
pub const CONFIG_PATHS_ENV: &str = "FOLIO_CONFIG";

/// Load the configuration from the embedded defaults, the files listed in
/// `FOLIO_CONFIG` and the process environment.
pub fn load() -> anyhow::Result<Config> {
    let paths = std::env::var(CONFIG_PATHS_ENV).unwrap_or_default();
    let paths = paths.split(':').filter(|p| !p.is_empty()).collect::<Vec<_>>();
    load_from(&paths, |key| std::env::var(key).ok())
}

/// Like [`load`], but reads overrides through `env` instead of the process
/// environment.
pub fn load_from(
    paths: &[impl AsRef<Path>],
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Config> {
    let builder = config::Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    let builder = paths.iter().try_fold(builder, |builder, path| {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        anyhow::Ok(builder.add_source(File::from_str(&content, FileFormat::Toml)))
    })?;

    let port = env("PORT")
        .map(|port| port.parse::<u16>())
        .transpose()
        .context("PORT is not a valid port number")?;
    let cors_origins = env("CORS_ORIGINS").map(|origins| {
        origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(ToOwned::to_owned)
            .collect::<Vec<_>>()
    });

    builder
        .set_override_option("http.port", port.map(i64::from))?
        .set_override_option("http.host", env("HOST"))?
        .set_override_option("http.cors_origins", cors_origins)?
        .set_override_option("database.url", env("DATABASE_URL"))?
        .set_override_option("admin.secret", env("ADMIN_SECRET"))?
        .set_override_option("environment", env("APP_ENV"))?
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub environment: String,
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub body_limit: usize,
    pub cors_origins: Vec<String>,
    pub real_ip: Option<HttpRealIpConfig>,
}

/// Trust `header` for the client address, but only on connections from
/// `set_from` (usually a reverse proxy).
#[derive(Debug, Deserialize)]
pub struct HttpRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

#[derive(Debug, Deserialize)]
pub struct AdminConfig {
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u64,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}

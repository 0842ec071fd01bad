#![allow(dead_code, reason = "not every test binary uses every helper")]

use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    Router,
};
use folio_api_rest::{RestServer, RestServerConfig, RestServerRateLimitConfig};
use folio_auth_impl::{AuthServiceConfig, AuthServiceImpl};
use folio_core_contact_contracts::MockContactFeatureService;
use folio_core_health_contracts::MockHealthFeatureService;
use tower::ServiceExt;

pub const ADMIN_SECRET: &str = "correct horse battery staple";
pub const CLIENT_IP: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(203, 0, 113, 9));

pub fn config() -> RestServerConfig {
    RestServerConfig {
        addr: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        environment: "test".into(),
        body_limit: 10 * 1024,
        allowed_origins: vec!["http://localhost:5173".parse().unwrap()],
        real_ip_config: None,
        rate_limit: RestServerRateLimitConfig {
            window: Duration::from_secs(15 * 60),
            max_requests: 50,
        },
    }
}

pub fn router(health: MockHealthFeatureService, contact: MockContactFeatureService) -> Router {
    router_with_config(config(), health, contact)
}

pub fn router_with_config(
    config: RestServerConfig,
    health: MockHealthFeatureService,
    contact: MockContactFeatureService,
) -> Router {
    build_router(config, ADMIN_SECRET, health, contact)
}

pub fn router_with_secret(
    admin_secret: &str,
    health: MockHealthFeatureService,
    contact: MockContactFeatureService,
) -> Router {
    build_router(config(), admin_secret, health, contact)
}

fn build_router(
    config: RestServerConfig,
    admin_secret: &str,
    health: MockHealthFeatureService,
    contact: MockContactFeatureService,
) -> Router {
    let auth = AuthServiceImpl::new(AuthServiceConfig {
        admin_secret: Some(admin_secret.into()),
    });
    RestServer::new(config, health, contact, auth).router()
}

pub fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .extension(ConnectInfo(SocketAddr::new(CLIENT_IP, 48213)))
}

pub fn json_request(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
    request(method, uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub fn admin_request(method: Method, uri: &str, secret: Option<&str>) -> Request<Body> {
    let mut builder = request(method, uri);
    if let Some(secret) = secret {
        // raw bytes, so that non-ascii secrets reach the server unchanged
        let secret = HeaderValue::from_bytes(secret.as_bytes()).unwrap();
        builder = builder.header("X-Admin-Secret", secret);
    }
    builder.body(Body::empty()).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse {
        status,
        headers,
        body,
    }
}

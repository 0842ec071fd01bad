use std::{net::IpAddr, sync::Arc};

use axum::{
    body::Body,
    http::{header, Method, StatusCode},
};
use common::{
    admin_request, config, json_request, request, router, router_with_config, send, ADMIN_SECRET,
};
use folio_api_rest::RestServerRealIpConfig;
use folio_core_contact_contracts::{ContactSubmitError, MockContactFeatureService};
use folio_core_health_contracts::{HealthStatus, MockHealthFeatureService};
use folio_models::contact::{ContactMessage, ContactMessageDraft, ContactMessageViolation};
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;

#[tokio::test]
async fn health() {
    // Arrange
    let health = MockHealthFeatureService::new().with_get_status(HealthStatus { database: true });
    let router = router(health, MockContactFeatureService::new());

    // Act
    let response = send(
        &router,
        request(Method::GET, "/api/health").body(Body::empty()).unwrap(),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["message"], "Portfolio API is running");
    assert_eq!(response.body["environment"], "test");
    assert_eq!(response.body["database"], true);
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn health_database_down() {
    // Arrange
    let health = MockHealthFeatureService::new().with_get_status(HealthStatus { database: false });
    let router = router(health, MockContactFeatureService::new());

    // Act
    let response = send(
        &router,
        request(Method::GET, "/api/health").body(Body::empty()).unwrap(),
    )
    .await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["database"], false);
}

#[tokio::test]
async fn route_not_found() {
    let router = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    for (method, uri) in [
        (Method::GET, "/"),
        (Method::GET, "/api"),
        (Method::GET, "/api/contacts"),
        (Method::DELETE, "/api/contact"),
        (Method::POST, "/api/health"),
    ] {
        let response = send(&router, request(method, uri).body(Body::empty()).unwrap()).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            response.body,
            json!({ "success": false, "message": "Route not found." })
        );
    }
}

#[tokio::test]
async fn security_headers() {
    let router = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    let response = send(&router, request(Method::GET, "/").body(Body::empty()).unwrap()).await;

    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "SAMEORIGIN"),
        ("x-xss-protection", "0"),
        ("referrer-policy", "no-referrer"),
        ("cross-origin-opener-policy", "same-origin"),
    ] {
        assert_eq!(response.headers.get(name).unwrap(), value, "{name}");
    }
    assert!(response.headers.contains_key("content-security-policy"));
    assert!(response.headers.contains_key("strict-transport-security"));
}

#[tokio::test]
async fn request_id() {
    let router = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    let first = send(&router, request(Method::GET, "/").body(Body::empty()).unwrap()).await;
    let second = send(&router, request(Method::GET, "/").body(Body::empty()).unwrap()).await;

    let first = first.headers.get("x-request-id").unwrap();
    let second = second.headers.get("x-request-id").unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn cors_preflight() {
    let router = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    let response = send(
        &router,
        request(Method::OPTIONS, "/api/contact/admin")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-admin-secret")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
    assert_eq!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
            .unwrap(),
        "x-admin-secret"
    );
}

#[tokio::test]
async fn cors_unknown_origin() {
    let router = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    let response = send(
        &router,
        request(Method::GET, "/")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert!(!response
        .headers
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn rate_limit() {
    // Arrange
    let router = router(
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    // Act
    let mut responses = Vec::new();
    for _ in 0..51 {
        responses.push(send(&router, admin_request(Method::GET, "/api/contact/admin", None)).await);
    }

    // Assert
    for response in &responses[..50] {
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(responses[0].headers.get("ratelimit-limit").unwrap(), "50");
    assert_eq!(responses[0].headers.get("ratelimit-remaining").unwrap(), "49");
    assert_eq!(responses[49].headers.get("ratelimit-remaining").unwrap(), "0");

    let rejected = &responses[50];
    assert_eq!(rejected.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        rejected.body,
        json!({ "success": false, "message": "Too many requests. Please try again later." })
    );
    assert_eq!(rejected.headers.get("ratelimit-remaining").unwrap(), "0");
    assert!(rejected.headers.contains_key("retry-after"));
}

#[tokio::test]
async fn rate_limit_only_applies_to_api() {
    let mut config = config();
    config.rate_limit.max_requests = 1;
    let router = router_with_config(
        config,
        MockHealthFeatureService::new(),
        MockContactFeatureService::new(),
    );

    for _ in 0..3 {
        let response = send(&router, request(Method::GET, "/").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(!response.headers.contains_key("ratelimit-limit"));
    }

    let first = send(&router, admin_request(Method::GET, "/api/contact/admin", None)).await;
    let second = send(&router, admin_request(Method::GET, "/api/contact/admin", None)).await;
    assert_eq!(first.status, StatusCode::UNAUTHORIZED);
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn real_ip_from_trusted_proxy() {
    // Arrange
    let real_ip = IpAddr::from([198, 51, 100, 77]);
    let mut config = config();
    config.real_ip_config = Some(Arc::new(RestServerRealIpConfig {
        header: "x-real-ip".into(),
        set_from: common::CLIENT_IP,
    }));

    let draft = ContactMessageDraft::default();
    let contact = MockContactFeatureService::new().with_submit(
        draft,
        Some(real_ip),
        Err(ContactSubmitError::Invalid(
            ContactMessageViolation::NameRequired.into(),
        )),
    );
    let router = router_with_config(config, MockHealthFeatureService::new(), contact);

    let mut request = json_request(Method::POST, "/api/contact", "{}");
    request
        .headers_mut()
        .insert("x-real-ip", real_ip.to_string().parse().unwrap());

    // Act
    let response = send(&router, request).await;

    // Assert
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn panic_keeps_cors_and_security_headers() {
    // Arrange
    let mut contact = MockContactFeatureService::new();
    contact.expect_list_messages().once().returning(|| {
        Box::pin(futures::future::lazy(
            |_| -> anyhow::Result<Vec<ContactMessage>> { panic!("list_messages exploded") },
        ))
    });
    let router = router(MockHealthFeatureService::new(), contact);

    let mut request = admin_request(Method::GET, "/api/contact/admin", Some(ADMIN_SECRET));
    request
        .headers_mut()
        .insert(header::ORIGIN, "http://localhost:5173".parse().unwrap());

    // Act
    let response = send(&router, request).await;

    // Assert
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body,
        json!({ "success": false, "message": "Something went wrong!" })
    );
    assert_eq!(
        response
            .headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers.get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers.get("ratelimit-remaining").unwrap(), "49");
    assert!(response.headers.contains_key("x-request-id"));
}

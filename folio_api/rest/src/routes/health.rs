use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use chrono::{DateTime, Utc};
use folio_core_health_contracts::{HealthFeatureService, HealthStatus};
use serde::Serialize;

struct HealthState<Health> {
    service: Arc<Health>,
    environment: Arc<str>,
}

pub fn router(service: Arc<impl HealthFeatureService>, environment: Arc<str>) -> Router<()> {
    Router::new()
        .route("/api/health", routing::get(health))
        .with_state(Arc::new(HealthState {
            service,
            environment,
        }))
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    success: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
    environment: &'a str,
    database: bool,
}

async fn health(state: State<Arc<HealthState<impl HealthFeatureService>>>) -> Response {
    let HealthStatus { database } = state.service.get_status().await;

    Json(HealthResponse {
        success: true,
        message: "Portfolio API is running",
        timestamp: Utc::now(),
        environment: &state.environment,
        database,
    })
    .into_response()
}

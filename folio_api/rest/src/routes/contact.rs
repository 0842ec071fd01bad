use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use folio_auth_contracts::{AuthError, AuthService};
use folio_core_contact_contracts::{
    ContactFeatureService, ContactMarkReadError, ContactSubmitError,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::{error, internal_server_error};
use crate::{
    extractors::admin_secret::AdminSecret,
    middlewares::client_ip::ClientIp,
    models::contact::{ApiContactMessage, ApiContactMessageDraft, ApiContactMessageReceipt},
};

struct ContactState<Contact, Auth> {
    contact: Arc<Contact>,
    auth: Arc<Auth>,
}

pub fn router(
    contact: Arc<impl ContactFeatureService>,
    auth: Arc<impl AuthService>,
) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(submit))
        .route("/api/contact/admin", routing::get(list))
        .route("/api/contact/:id/read", routing::patch(mark_read))
        .with_state(Arc::new(ContactState { contact, auth }))
}

#[derive(Serialize)]
struct SubmitResponse {
    success: bool,
    message: &'static str,
    data: ApiContactMessageReceipt,
}

#[derive(Serialize)]
struct ListResponse {
    success: bool,
    count: usize,
    data: Vec<ApiContactMessage>,
}

#[derive(Serialize)]
struct MarkReadResponse {
    success: bool,
    data: ApiContactMessage,
}

async fn submit(
    state: State<Arc<ContactState<impl ContactFeatureService, impl AuthService>>>,
    client_ip: Option<Extension<ClientIp>>,
    body: Result<Json<ApiContactMessageDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(rejection),
    };
    let source_ip = client_ip.map(|Extension(ClientIp(ip))| ip);

    match state.contact.submit(draft.into(), source_ip).await {
        Ok(message) => (
            StatusCode::CREATED,
            Json(SubmitResponse {
                success: true,
                message: "Message received! I'll get back to you shortly.",
                data: message.into(),
            }),
        )
            .into_response(),
        Err(ContactSubmitError::Invalid(violations)) => {
            error(StatusCode::BAD_REQUEST, violations.to_string())
        }
        Err(ContactSubmitError::Other(err)) => {
            internal_server_error(err, "Server error. Please try again.")
        }
    }
}

async fn list(
    state: State<Arc<ContactState<impl ContactFeatureService, impl AuthService>>>,
    secret: AdminSecret,
) -> Response {
    if let Err(err) = state.auth.authenticate_admin(secret.as_bytes()) {
        return auth_error(err);
    }

    match state.contact.list_messages().await {
        Ok(messages) => Json(ListResponse {
            success: true,
            count: messages.len(),
            data: messages.into_iter().map(Into::into).collect(),
        })
        .into_response(),
        Err(err) => internal_server_error(err, "Server error."),
    }
}

async fn mark_read(
    state: State<Arc<ContactState<impl ContactFeatureService, impl AuthService>>>,
    secret: AdminSecret,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    if let Err(err) = state.auth.authenticate_admin(secret.as_bytes()) {
        return auth_error(err);
    }

    let Some(message_id) = path.ok().and_then(|Path(id)| id.parse::<Uuid>().ok()) else {
        return not_found();
    };

    match state.contact.mark_read(message_id.into()).await {
        Ok(message) => Json(MarkReadResponse {
            success: true,
            data: message.into(),
        })
        .into_response(),
        Err(ContactMarkReadError::NotFound) => not_found(),
        Err(ContactMarkReadError::Other(err)) => internal_server_error(err, "Server error."),
    }
}

fn auth_error(err: AuthError) -> Response {
    match err {
        AuthError::Unauthorized => error(StatusCode::UNAUTHORIZED, "Unauthorized."),
    }
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Not found.")
}

fn invalid_body(rejection: JsonRejection) -> Response {
    debug!("rejected request body: {rejection}");
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => {
            error(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
        }
        _ => error(StatusCode::BAD_REQUEST, "Invalid request body."),
    }
}

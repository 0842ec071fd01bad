use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderValue},
};

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Extract the shared admin secret from the `X-Admin-Secret` header.
///
/// The raw header bytes are kept, so secrets outside visible ASCII still
/// compare correctly.
pub struct AdminSecret(pub Option<HeaderValue>);

impl AdminSecret {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_ref().map(HeaderValue::as_bytes)
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminSecret {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.headers.get(ADMIN_SECRET_HEADER).cloned()))
    }
}

use std::sync::Arc;

use folio_auth_contracts::{AuthError, AuthService};
use subtle::ConstantTimeEq;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct AuthServiceImpl {
    config: AuthServiceConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AuthServiceConfig {
    /// `None` or empty disables every admin route.
    pub admin_secret: Option<Arc<str>>,
}

impl AuthServiceImpl {
    pub fn new(config: AuthServiceConfig) -> Self {
        Self { config }
    }
}

impl AuthService for AuthServiceImpl {
    fn authenticate_admin(&self, secret: Option<&[u8]>) -> Result<(), AuthError> {
        let Some(expected) = self.config.admin_secret.as_deref().filter(|s| !s.is_empty()) else {
            debug!("no admin secret configured, rejecting admin request");
            return Err(AuthError::Unauthorized);
        };
        let secret = secret.filter(|s| !s.is_empty()).ok_or(AuthError::Unauthorized)?;

        // slices of different length compare unequal without a byte scan
        bool::from(secret.ct_eq(expected.as_bytes()))
            .then_some(())
            .ok_or(AuthError::Unauthorized)
    }
}

use thiserror::Error;

pub trait AuthService: Send + Sync + 'static {
    /// Verify the shared secret presented by an admin client.
    ///
    /// `secret` is compared byte for byte. Rejects a missing or empty secret,
    /// and every secret if none is configured.
    fn authenticate_admin(&self, secret: Option<&[u8]>) -> Result<(), AuthError>;
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized.")]
    Unauthorized,
}

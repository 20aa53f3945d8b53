//! Authentication ports.
//!
//! Tokens are issued by an external identity provider; the backend only
//! verifies them.

/// Claims extracted from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Provider-side user identifier (`sub`).
    pub subject: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub exp: i64,
}

/// Verifies bearer credentials presented on admin requests.
pub trait TokenVerifier: Send + Sync {
    /// Validate and decode a token.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Token error: {0}")]
    Signing(String),
}

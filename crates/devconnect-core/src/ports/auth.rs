//! Authentication ports: session tokens and password hashing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Role, User};

/// The claim set carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    /// Avatar reference.
    pub picture: Option<String>,
    pub role: Role,
}

impl From<&User> for SessionClaims {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            picture: user.image.clone(),
            role: user.role,
        }
    }
}

/// Claims decoded from a valid token, with its validity window.
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub claims: SessionClaims,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Token service trait for signed, time-bound session tokens.
pub trait TokenService: Send + Sync {
    /// Sign `claims` into a token valid for [`TokenService::expiration_seconds`].
    fn generate_token(&self, claims: &SessionClaims) -> Result<String, AuthError>;

    /// Check signature, issuer and expiry, then decode.
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Lifetime of freshly issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash. Comparison must be constant-time.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Every credential failure collapses into this one variant.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing session token")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

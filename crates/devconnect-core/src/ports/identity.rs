//! External identity provider port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A profile asserted by an external identity provider.
///
/// Only providers that have verified the email should return one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub provider: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Exchanges a provider access token for a verified profile.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider id as used in the callback route (`github`, `google`).
    fn id(&self) -> &'static str;

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Provider rejected the access token")]
    Rejected,

    #[error("Provider returned no verified email")]
    UnverifiedEmail,

    #[error("Provider request failed: {0}")]
    Transport(String),
}

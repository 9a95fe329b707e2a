use async_trait::async_trait;
use serde::Deserialize;

use devconnect_core::ports::{ExternalProfile, IdentityError, IdentityProvider};

use super::{check_status, client, transport};

pub const DEFAULT_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// OpenID Connect userinfo response.
#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

impl UserInfo {
    fn into_profile(self, provider: &str) -> Result<ExternalProfile, IdentityError> {
        match self.email {
            Some(email) if self.email_verified => Ok(ExternalProfile {
                provider: provider.to_string(),
                email,
                name: self.name,
                image: self.picture,
            }),
            _ => Err(IdentityError::UnverifiedEmail),
        }
    }
}

/// Google identity provider.
pub struct GoogleProvider {
    userinfo_url: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(userinfo_url: impl Into<String>) -> Self {
        Self {
            userinfo_url: userinfo_url.into(),
            client: client(),
        }
    }
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::new(DEFAULT_USERINFO_URL)
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn id(&self) -> &'static str {
        "google"
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, IdentityError> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;

        let info: UserInfo = check_status(response)?.json().await.map_err(transport)?;
        info.into_profile(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> UserInfo {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_verified_email_accepted() {
        let profile = parse(
            r#"{"sub":"1","email":"ada@dev.io","email_verified":true,"name":"Ada","picture":"https://img"}"#,
        )
        .into_profile("google")
        .unwrap();

        assert_eq!(profile.email, "ada@dev.io");
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(profile.image.as_deref(), Some("https://img"));
    }

    #[test]
    fn test_unverified_email_rejected() {
        let result = parse(r#"{"email":"ada@dev.io","email_verified":false}"#).into_profile("google");
        assert!(matches!(result, Err(IdentityError::UnverifiedEmail)));
    }

    #[test]
    fn test_missing_email_rejected() {
        let result = parse(r#"{"sub":"1"}"#).into_profile("google");
        assert!(matches!(result, Err(IdentityError::UnverifiedEmail)));
    }
}

use async_trait::async_trait;
use serde::Deserialize;

use devconnect_core::ports::{ExternalProfile, IdentityError, IdentityProvider};

use super::{check_status, client, transport};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

/// GitHub identity provider. The public profile email is not trusted; the
/// verified primary address from `/user/emails` is used instead.
pub struct GithubProvider {
    api_url: String,
    client: reqwest::Client,
}

impl GithubProvider {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client: client(),
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T, IdentityError> {
        let response = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(transport)?;

        check_status(response)?.json().await.map_err(transport)
    }
}

impl Default for GithubProvider {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Pick the verified primary address, falling back to any verified one.
fn verified_email(emails: Vec<GithubEmail>) -> Option<String> {
    let (primary, rest): (Vec<_>, Vec<_>) = emails
        .into_iter()
        .filter(|e| e.verified)
        .partition(|e| e.primary);

    primary.into_iter().chain(rest).next().map(|e| e.email)
}

#[async_trait]
impl IdentityProvider for GithubProvider {
    fn id(&self) -> &'static str {
        "github"
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, IdentityError> {
        let user: GithubUser = self.get("/user", access_token).await?;
        let emails: Vec<GithubEmail> = self.get("/user/emails", access_token).await?;

        let email = verified_email(emails).ok_or(IdentityError::UnverifiedEmail)?;
        tracing::debug!(login = %user.login, "GitHub profile fetched");

        Ok(ExternalProfile {
            provider: self.id().to_string(),
            email,
            name: user.name.or(Some(user.login)),
            image: user.avatar_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(address: &str, primary: bool, verified: bool) -> GithubEmail {
        GithubEmail {
            email: address.to_string(),
            primary,
            verified,
        }
    }

    #[test]
    fn test_primary_verified_email_wins() {
        let picked = verified_email(vec![
            email("other@dev.io", false, true),
            email("main@dev.io", true, true),
        ]);
        assert_eq!(picked.as_deref(), Some("main@dev.io"));
    }

    #[test]
    fn test_unverified_primary_is_skipped() {
        let picked = verified_email(vec![
            email("main@dev.io", true, false),
            email("other@dev.io", false, true),
        ]);
        assert_eq!(picked.as_deref(), Some("other@dev.io"));
    }

    #[test]
    fn test_no_verified_email() {
        assert!(verified_email(vec![email("main@dev.io", true, false)]).is_none());
    }
}

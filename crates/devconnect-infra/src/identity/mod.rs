//! External identity providers over HTTPS.

mod github;
mod google;

pub use github::{DEFAULT_API_URL as GITHUB_API_URL, GithubProvider};
pub use google::{DEFAULT_USERINFO_URL as GOOGLE_USERINFO_URL, GoogleProvider};

use devconnect_core::ports::IdentityError;

const USER_AGENT: &str = concat!("devconnect/", env!("CARGO_PKG_VERSION"));

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}

/// Map a provider response status; 401/403 mean the token was not accepted.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(IdentityError::Rejected);
    }
    if !status.is_success() {
        return Err(IdentityError::Transport(format!("unexpected status {status}")));
    }
    Ok(response)
}

fn transport(e: reqwest::Error) -> IdentityError {
    IdentityError::Transport(e.to_string())
}

//! Application state - shared across all handlers.

use std::collections::HashMap;
use std::sync::Arc;

use devconnect_core::ports::{IdentityProvider, PasswordService, RateLimiter, TokenService};
use devconnect_core::services::SessionResolver;
use devconnect_infra::{Argon2PasswordService, JwtTokenService, Repositories};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub sessions: Arc<SessionResolver>,
    pub passwords: Arc<dyn PasswordService>,
    pub tokens: Arc<dyn TokenService>,
    /// Throttles credential sign-in per client address. `None` disables throttling.
    pub login_limiter: Option<Arc<dyn RateLimiter>>,
    pub providers: Arc<HashMap<&'static str, Arc<dyn IdentityProvider>>>,
    pub session: SessionConfig,
}

impl AppState {
    /// Build the state, connecting to PostgreSQL when `DATABASE_URL` is configured.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let repos = Self::repositories(config).await?;
        Ok(Self::with_repositories(repos, config))
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
        match &config.database {
            Some(db_config) => {
                let conn = devconnect_infra::database::connect(db_config).await?;
                Ok(Repositories::postgres(conn))
            }
            None => {
                tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
                Ok(Repositories::in_memory())
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
        }
        Ok(Repositories::in_memory())
    }

    /// Wire services around an existing set of repositories.
    pub fn with_repositories(repos: Repositories, config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let sessions = Arc::new(SessionResolver::new(
            repos.users.clone(),
            passwords.clone(),
            tokens.clone(),
        ));

        #[cfg(feature = "rate-limit")]
        let login_limiter: Option<Arc<dyn RateLimiter>> = Some(Arc::new(
            devconnect_infra::InMemoryRateLimiter::new(config.login_rate_limit.clone()),
        ));
        #[cfg(not(feature = "rate-limit"))]
        let login_limiter: Option<Arc<dyn RateLimiter>> = None;

        let providers = Arc::new(Self::identity_providers(config));

        tracing::info!(
            providers = providers.len(),
            login_throttling = login_limiter.is_some(),
            "Application state initialized"
        );

        Self {
            repos,
            sessions,
            passwords,
            tokens,
            login_limiter,
            providers,
            session: config.session.clone(),
        }
    }

    #[cfg(feature = "oauth")]
    fn identity_providers(config: &AppConfig) -> HashMap<&'static str, Arc<dyn IdentityProvider>> {
        use devconnect_infra::{GithubProvider, GoogleProvider};

        let providers: [Arc<dyn IdentityProvider>; 2] = [
            Arc::new(GithubProvider::new(config.providers.github_api_url.clone())),
            Arc::new(GoogleProvider::new(
                config.providers.google_userinfo_url.clone(),
            )),
        ];

        providers.into_iter().map(|p| (p.id(), p)).collect()
    }

    #[cfg(not(feature = "oauth"))]
    fn identity_providers(_config: &AppConfig) -> HashMap<&'static str, Arc<dyn IdentityProvider>> {
        HashMap::new()
    }

    /// Register an extra identity provider, replacing one with the same id.
    pub fn with_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        let mut providers = (*self.providers).clone();
        providers.insert(provider.id(), provider);
        self.providers = Arc::new(providers);
        self
    }
}

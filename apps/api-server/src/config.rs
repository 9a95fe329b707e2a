//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use devconnect_infra::JwtConfig;
use devconnect_infra::database::DatabaseConfig;

#[cfg(feature = "rate-limit")]
use devconnect_infra::RateLimitConfig;

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Session cookie and sign-in redirect settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    /// Sent as `Location` when a protected route is hit without a session.
    pub sign_in_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "devconnect.session-token".to_string(),
            cookie_secure: false,
            sign_in_path: "/sign-in".to_string(),
        }
    }
}

/// Base URLs of the external identity providers.
#[cfg(feature = "oauth")]
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub github_api_url: String,
    pub google_userinfo_url: String,
}

#[cfg(feature = "oauth")]
impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            github_api_url: devconnect_infra::identity::GITHUB_API_URL.to_string(),
            google_userinfo_url: devconnect_infra::identity::GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    #[cfg(feature = "rate-limit")]
    pub login_rate_limit: RateLimitConfig,
    #[cfg(feature = "oauth")]
    pub providers: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: None,
            jwt: JwtConfig::default(),
            session: SessionConfig::default(),
            #[cfg(feature = "rate-limit")]
            login_rate_limit: RateLimitConfig::default(),
            #[cfg(feature = "oauth")]
            providers: ProviderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            config.max_connections =
                parsed("DB_MAX_CONNECTIONS").unwrap_or(config.max_connections);
            config.min_connections =
                parsed("DB_MIN_CONNECTIONS").unwrap_or(config.min_connections);
            config
        });

        let session = SessionConfig {
            cookie_name: env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.session.cookie_name),
            cookie_secure: parsed("SESSION_COOKIE_SECURE").unwrap_or(defaults.session.cookie_secure),
            sign_in_path: env::var("SIGN_IN_PATH").unwrap_or(defaults.session.sign_in_path),
        };

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT").unwrap_or(defaults.port),
            database,
            jwt: JwtConfig::from_env(),
            session,
            #[cfg(feature = "rate-limit")]
            login_rate_limit: RateLimitConfig::from_env("LOGIN_RATE_LIMIT"),
            #[cfg(feature = "oauth")]
            providers: ProviderConfig {
                github_api_url: env::var("GITHUB_API_URL")
                    .unwrap_or(defaults.providers.github_api_url),
                google_userinfo_url: env::var("GOOGLE_USERINFO_URL")
                    .unwrap_or(defaults.providers.google_userinfo_url),
            },
        }
    }
}

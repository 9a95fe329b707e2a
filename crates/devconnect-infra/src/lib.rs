//! # DevConnect Infrastructure
//!
//! Concrete implementations of the ports defined in `devconnect-core`:
//! persistence, session tokens, password hashing, sign-in throttling and
//! external identity providers.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store only
//! - `postgres` - PostgreSQL persistence via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Sign-in throttling via governor
//! - `oauth` - GitHub and Google identity providers via reqwest

pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "oauth")]
pub mod identity;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use database::{DatabaseConfig, InMemoryStore, Repositories};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "oauth")]
pub use identity::{GithubProvider, GoogleProvider};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod identity;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, SessionClaims, TokenClaims, TokenService};
pub use identity::{ExternalProfile, IdentityError, IdentityProvider};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{
    BaseRepository, BookmarkRepository, CommentRepository, PostRepository, TagRepository,
    UserRepository,
};

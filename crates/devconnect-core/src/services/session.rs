//! Credential and session resolution.
//!
//! Turns a login attempt or an external identity into a signed token, and on
//! every later request turns that token back into a [`Session`] built from the
//! current user row.
//!
//! Claim refresh overwrites every claim from storage without comparing
//! versions. Two concurrent requests holding the same token may see different
//! snapshots of the user; nothing flags that.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::RepoError;
use crate::ports::{
    AuthError, ExternalProfile, PasswordService, SessionClaims, TokenService, UserRepository,
};

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
    pub expires_at: DateTime<Utc>,
}

/// The user part of the session every handler sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub role: Role,
}

/// Externally visible session shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

/// Result of resolving a token: the session plus the refreshed claims, so the
/// caller can re-issue the token if it wants to.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub session: Session,
    pub claims: SessionClaims,
}

/// Credential/session resolver.
pub struct SessionResolver {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn TokenService>,
}

fn backend(err: RepoError) -> AuthError {
    AuthError::Backend(err.to_string())
}

impl SessionResolver {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Check an email/password pair.
    ///
    /// Every failing check returns [`AuthError::InvalidCredentials`] so callers
    /// cannot tell an unknown email from a wrong password.
    pub async fn authorize(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(backend)?
            .ok_or(AuthError::InvalidCredentials)?;

        let Some(hash) = user.hashed_password.as_deref() else {
            tracing::debug!(user_id = %user.id, "Credential sign-in for account without password");
            return Err(AuthError::InvalidCredentials);
        };

        match self.passwords.verify(password, hash) {
            Ok(true) => Ok(user),
            Ok(false) => Err(AuthError::InvalidCredentials),
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Sign a token carrying the user's id, name, email, avatar and role.
    pub fn issue_token(&self, user: &User) -> Result<IssuedToken, AuthError> {
        self.issue_claims(SessionClaims::from(user))
    }

    /// Sign an arbitrary claim set, e.g. the output of [`Self::refresh_claims`].
    pub fn issue_claims(&self, claims: SessionClaims) -> Result<IssuedToken, AuthError> {
        let token = self.tokens.generate_token(&claims)?;
        let expires_at = Utc::now() + TimeDelta::seconds(self.tokens.expiration_seconds());

        Ok(IssuedToken {
            token,
            claims,
            expires_at,
        })
    }

    /// Re-read the user behind `claims` and rebuild them from the stored row.
    ///
    /// A missing user keeps the token's claims as they are, so the id survives.
    /// A storage failure does the same; it never ends the session.
    pub async fn refresh_claims(&self, claims: SessionClaims) -> SessionClaims {
        match self.users.find_by_email(&claims.email).await {
            Ok(Some(user)) => SessionClaims::from(&user),
            Ok(None) => {
                tracing::debug!(user_id = %claims.id, "Session user no longer exists, keeping token claims");
                claims
            }
            Err(e) => {
                tracing::warn!(user_id = %claims.id, error = %e, "Claim refresh failed, keeping token claims");
                claims
            }
        }
    }

    /// Map claims onto the session shape.
    pub fn project_session(claims: &SessionClaims, expires: DateTime<Utc>) -> Session {
        Session {
            user: SessionUser {
                id: claims.id,
                name: claims.name.clone(),
                email: claims.email.clone(),
                image: claims.picture.clone(),
                role: claims.role,
            },
            expires,
        }
    }

    /// Validate a token, refresh its claims and project the session.
    pub async fn resolve(&self, token: &str) -> Result<ResolvedSession, AuthError> {
        let decoded = self.tokens.validate_token(token)?;
        let claims = self.refresh_claims(decoded.claims).await;
        let session = Self::project_session(&claims, decoded.expires_at);

        Ok(ResolvedSession { session, claims })
    }

    /// Find or create the user behind a verified external identity.
    ///
    /// First sign-in creates a password-less user from the profile. Later
    /// sign-ins return the stored row untouched.
    pub async fn sign_in_external(&self, profile: ExternalProfile) -> Result<User, AuthError> {
        if let Some(user) = self
            .users
            .find_by_email(&profile.email)
            .await
            .map_err(backend)?
        {
            return Ok(user);
        }

        let user = User::from_external(profile.email.clone(), profile.name, profile.image);
        match self.users.insert(user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, provider = %profile.provider, "Created user from external identity");
                Ok(user)
            }
            // Lost a race with a concurrent first sign-in for the same email.
            Err(RepoError::Constraint(_)) => self
                .users
                .find_by_email(&profile.email)
                .await
                .map_err(backend)?
                .ok_or_else(|| AuthError::Backend("user vanished after conflict".to_string())),
            Err(e) => Err(backend(e)),
        }
    }
}

//! Session extractors.
//!
//! The session token is read from the session cookie, falling back to an
//! `Authorization: Bearer` header. Handlers take the session as an argument:
//! ```ignore
//! async fn dashboard(session: CurrentSession) -> AppResult<HttpResponse> {
//!     let user_id = session.user_id();
//!     // ...
//! }
//! ```

use std::future::Future;
use std::pin::Pin;

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use uuid::Uuid;

use devconnect_core::domain::User;
use devconnect_core::ports::{AuthError, SessionClaims};
use devconnect_core::services::Session;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// A resolved session. Rejects the request with a sign-in redirect when absent.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session: Session,
    /// Claims after the refresh, ready to be re-issued.
    pub claims: SessionClaims,
}

impl CurrentSession {
    pub fn user_id(&self) -> Uuid {
        self.session.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.session.user.role.is_admin()
    }

    /// Whether the caller may modify a resource owned by `owner_id`.
    pub fn can_modify(&self, owner_id: Uuid) -> bool {
        self.user_id() == owner_id || self.is_admin()
    }

    /// Load the caller's user row before writing on their behalf.
    ///
    /// Tokens outlive deleted accounts; a missing row is treated as no session.
    pub async fn user(&self, state: &AppState) -> AppResult<User> {
        state
            .repos
            .users
            .find_by_id(self.user_id())
            .await?
            .ok_or_else(|| {
                tracing::debug!(user_id = %self.user_id(), "Session user no longer exists");
                AppError::Unauthenticated {
                    sign_in_path: state.session.sign_in_path.clone(),
                }
            })
    }
}

/// Pull the raw token from the cookie or the Authorization header.
fn session_token(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    if let Some(cookie) = req.cookie(cookie_name) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl FromRequest for CurrentSession {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            tracing::error!("AppState not found in app data");
            return Box::pin(async {
                Err::<Self, _>(AppError::Internal("Server configuration error".into()))
            });
        };

        let token = session_token(req, &state.session.cookie_name);

        Box::pin(async move {
            let resolved = match token {
                Some(token) => state.sessions.resolve(&token).await,
                None => Err(AuthError::MissingAuth),
            };

            match resolved {
                Ok(resolved) => Ok(CurrentSession {
                    session: resolved.session,
                    claims: resolved.claims,
                }),
                Err(
                    e @ (AuthError::MissingAuth
                    | AuthError::TokenExpired
                    | AuthError::InvalidToken(_)),
                ) => {
                    tracing::debug!(reason = %e, "No usable session");
                    Err(AppError::Unauthenticated {
                        sign_in_path: state.session.sign_in_path.clone(),
                    })
                }
                Err(e) => Err(e.into()),
            }
        })
    }
}

/// Optional session extractor - never rejects; `None` for anonymous callers.
pub struct OptionalSession(pub Option<CurrentSession>);

impl FromRequest for OptionalSession {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = CurrentSession::from_request(req, payload);
        Box::pin(async move { Ok::<_, actix_web::Error>(OptionalSession(session.await.ok())) })
    }
}

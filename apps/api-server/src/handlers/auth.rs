//! Authentication handlers.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, HttpResponseBuilder, web};

use devconnect_core::domain::User;
use devconnect_core::error::RepoError;
use devconnect_core::services::{IssuedToken, SessionResolver};
use devconnect_shared::dto::{
    AuthResponse, CredentialsRequest, ExternalSignInRequest, RegisterUserRequest,
};

use crate::config::SessionConfig;
use crate::middleware::auth::CurrentSession;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views;

const MIN_PASSWORD_LEN: usize = 8;

fn session_cookie(config: &SessionConfig, issued: &IssuedToken) -> Cookie<'static> {
    let max_age = (issued.expires_at - chrono::Utc::now()).num_seconds().max(0);

    Cookie::build(config.cookie_name.clone(), issued.token.clone())
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age))
        .finish()
}

/// Respond with the token in the body and in the session cookie.
fn signed_in(state: &AppState, mut response: HttpResponseBuilder, issued: IssuedToken) -> HttpResponse {
    let session = SessionResolver::project_session(&issued.claims, issued.expires_at);
    let body = AuthResponse {
        access_token: issued.token.clone(),
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.expiration_seconds().max(0) as u64,
        session: views::session(&session),
    };

    response
        .cookie(session_cookie(&state.session, &issued))
        .json(body)
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let email = req.email.trim().to_string();

    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if state.repos.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let hash = state.passwords.hash(&req.password)?;
    let name = req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    let user = match state
        .repos
        .users
        .insert(User::with_password(email, name, hash))
        .await
    {
        Ok(user) => user,
        Err(RepoError::Constraint(_)) => {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "User registered");

    let issued = state.sessions.issue_token(&user)?;
    Ok(signed_in(&state, HttpResponse::Created(), issued))
}

/// POST /api/auth/callback/credentials
pub async fn sign_in_credentials(
    state: web::Data<AppState>,
    body: web::Json<CredentialsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .sessions
        .authorize(req.email.trim(), &req.password)
        .await?;

    tracing::info!(user_id = %user.id, "Credential sign-in");

    let issued = state.sessions.issue_token(&user)?;
    Ok(signed_in(&state, HttpResponse::Ok(), issued))
}

/// POST /api/auth/callback/{provider}
pub async fn sign_in_external(
    state: web::Data<AppState>,
    provider: web::Path<String>,
    body: web::Json<ExternalSignInRequest>,
) -> AppResult<HttpResponse> {
    let provider_id = provider.into_inner();
    let provider = state
        .providers
        .get(provider_id.as_str())
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Unknown provider '{provider_id}'")))?;

    let profile = provider.fetch_profile(&body.access_token).await?;
    let user = state.sessions.sign_in_external(profile).await?;

    tracing::info!(user_id = %user.id, provider = %provider_id, "External sign-in");

    let issued = state.sessions.issue_token(&user)?;
    Ok(signed_in(&state, HttpResponse::Ok(), issued))
}

/// GET /api/auth/session
///
/// Returns the refreshed session and re-issues the cookie with the new claims.
pub async fn session(state: web::Data<AppState>, current: CurrentSession) -> AppResult<HttpResponse> {
    let issued = state.sessions.issue_claims(current.claims)?;
    let session = SessionResolver::project_session(&issued.claims, issued.expires_at);

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state.session, &issued))
        .json(views::session(&session)))
}

/// POST /api/auth/signout
pub async fn sign_out(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = Cookie::build(state.session.cookie_name.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();

    HttpResponse::NoContent().cookie(cookie).finish()
}

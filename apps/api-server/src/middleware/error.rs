//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use devconnect_core::error::{DomainError, RepoError};
use devconnect_core::ports::{AuthError, IdentityError};
use devconnect_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Credential sign-in failed. Rendered without detail.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No usable session on a protected route; redirects to sign-in.
    #[error("Authentication required")]
    Unauthenticated { sign_in_path: String },

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials
            | AppError::Unauthorized(_)
            | AppError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::InvalidCredentials => ErrorResponse::invalid_credentials(),
            AppError::Unauthorized(detail) => ErrorResponse::unauthorized().with_detail(detail),
            AppError::Unauthenticated { .. } => ErrorResponse::unauthorized()
                .with_detail("Sign in to continue."),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Conflict(detail) => ErrorResponse::new(409, "Conflict").with_detail(detail),
            AppError::BadGateway(detail) => {
                tracing::warn!("Upstream error: {}", detail);
                ErrorResponse::new(502, "Bad Gateway")
                    .with_detail("The identity provider could not be reached.")
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        let mut response = HttpResponse::build(self.status_code());
        if let AppError::Unauthenticated { sign_in_path } = self {
            response.insert_header((header::LOCATION, sign_in_path.as_str()));
        }
        response.json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(constraint) => {
                tracing::warn!(constraint = %constraint, "Write rejected by a constraint");
                AppError::Conflict("The resource conflicts with existing data".to_string())
            }
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::TokenExpired => AppError::Unauthorized("Session expired".to_string()),
            AuthError::InvalidToken(msg) => AppError::Unauthorized(msg),
            AuthError::MissingAuth => AppError::Unauthorized("Missing session".to_string()),
            AuthError::HashingError(msg) | AuthError::Backend(msg) => AppError::Internal(msg),
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected => AppError::InvalidCredentials,
            IdentityError::UnverifiedEmail => {
                AppError::Unauthorized("The provider did not return a verified email".to_string())
            }
            IdentityError::Transport(msg) => AppError::BadGateway(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_carries_location() {
        let err = AppError::Unauthenticated {
            sign_in_path: "/sign-in".to_string(),
        };
        let response = err.error_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/sign-in"
        );
    }

    #[test]
    fn test_repo_constraint_is_conflict() {
        let err: AppError = RepoError::Constraint("posts_slug_key".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_constraint_name_stays_out_of_response() {
        let err: AppError = RepoError::Constraint("bookmarks_user_id_fkey".into()).into();
        let body = actix_web::body::to_bytes(err.error_response().into_body())
            .await
            .unwrap();

        assert!(!String::from_utf8_lossy(&body).contains("bookmarks_user_id_fkey"));
    }

    #[test]
    fn test_domain_validation_is_bad_request() {
        let err: AppError = DomainError::Validation("Title is required".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_backend_auth_failure_is_internal() {
        let err: AppError = AuthError::Backend("down".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

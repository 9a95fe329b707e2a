//! Bookmark handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use devconnect_shared::dto::BookmarkResponse;

use crate::middleware::auth::CurrentSession;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/posts/{id}/bookmark
///
/// Idempotent: bookmarking a saved post returns the existing bookmark.
pub async fn add_bookmark(
    state: web::Data<AppState>,
    session: CurrentSession,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let user = session.user(&state).await?;
    if state.repos.posts.find_by_id(post_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Post '{post_id}' not found")));
    }

    let bookmark = state.repos.bookmarks.add(user.id, post_id).await?;

    Ok(HttpResponse::Ok().json(BookmarkResponse {
        id: bookmark.id,
        post_id: bookmark.post_id,
        created_at: bookmark.created_at,
        post: None,
    }))
}

/// DELETE /api/posts/{id}/bookmark
pub async fn remove_bookmark(
    state: web::Data<AppState>,
    session: CurrentSession,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    let removed = state
        .repos
        .bookmarks
        .remove(session.user_id(), post_id)
        .await?;

    tracing::debug!(post_id = %post_id, removed, "Bookmark removed");

    Ok(HttpResponse::NoContent().finish())
}

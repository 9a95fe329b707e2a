//! Comment handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use devconnect_core::domain::{Comment, CommentWithAuthor};
use devconnect_shared::dto::CreateCommentRequest;

use crate::middleware::auth::CurrentSession;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views;

async fn ensure_post(state: &AppState, post_id: Uuid) -> AppResult<()> {
    match state.repos.posts.find_by_id(post_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFound(format!("Post '{post_id}' not found"))),
    }
}

/// GET /api/posts/{id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    ensure_post(&state, post_id).await?;

    let comments: Vec<_> = state
        .repos
        .comments
        .list_for_post(post_id)
        .await?
        .into_iter()
        .map(views::comment)
        .collect();

    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/posts/{id}/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    session: CurrentSession,
    post_id: web::Path<Uuid>,
    body: web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let post_id = post_id.into_inner();
    ensure_post(&state, post_id).await?;

    let author = session.user(&state).await?;

    let comment = Comment::new(post_id, author.id, &body.content)?;
    let comment = state.repos.comments.insert(comment).await?;

    tracing::debug!(comment_id = %comment.id, post_id = %post_id, "Comment added");

    Ok(HttpResponse::Created().json(views::comment(CommentWithAuthor {
        comment,
        author,
    })))
}

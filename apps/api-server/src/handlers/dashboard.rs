//! Dashboard and developer directory.

use actix_web::{HttpResponse, web};

use devconnect_shared::dto::DashboardResponse;

use crate::middleware::auth::CurrentSession;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views;

/// GET /api/dashboard
pub async fn dashboard(
    state: web::Data<AppState>,
    session: CurrentSession,
) -> AppResult<HttpResponse> {
    let user_id = session.user_id();

    let posts = state.repos.posts.find_by_author(user_id).await?;
    let bookmarks = state.repos.bookmarks.list_for_user(user_id).await?;

    Ok(HttpResponse::Ok().json(DashboardResponse {
        posts: posts.into_iter().map(views::own_post).collect(),
        bookmarks: bookmarks.into_iter().map(views::bookmark).collect(),
    }))
}

/// GET /api/developers
pub async fn developers(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users = state.repos.users.list().await?;
    let developers: Vec<_> = users.into_iter().map(views::developer).collect();

    Ok(HttpResponse::Ok().json(developers))
}

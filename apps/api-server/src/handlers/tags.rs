//! Tag page handler.

use actix_web::{HttpResponse, web};

use devconnect_shared::dto::TagPageResponse;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views;

/// GET /api/tags/{slug}
pub async fn get_tag(state: web::Data<AppState>, slug: web::Path<String>) -> AppResult<HttpResponse> {
    let slug = slug.into_inner();
    let page = state
        .repos
        .tags
        .find_by_slug_with_posts(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tag '{slug}' not found")))?;

    Ok(HttpResponse::Ok().json(TagPageResponse {
        tag: views::tag(page.tag),
        posts: page.posts.into_iter().map(views::post_summary).collect(),
    }))
}

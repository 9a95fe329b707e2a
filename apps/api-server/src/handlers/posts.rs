//! Article handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use devconnect_core::domain::{Post, PostDraft, normalize_tags, slugify};
use devconnect_core::error::RepoError;
use devconnect_shared::dto::{AuthorResponse, PostRequest};

use crate::middleware::auth::{CurrentSession, OptionalSession};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views;

fn draft(req: PostRequest) -> (PostDraft, Vec<String>) {
    let tags = normalize_tags(&req.tags);
    let draft = PostDraft {
        title: req.title,
        description: req.description.filter(|d| !d.trim().is_empty()),
        content: req.content,
        banner_image: req.banner_image.filter(|b| !b.trim().is_empty()),
        published: req.published,
    };
    (draft, tags)
}

fn session_author(session: &CurrentSession) -> AuthorResponse {
    AuthorResponse {
        id: session.user_id(),
        name: session.session.user.name.clone(),
        image: session.session.user.image.clone(),
    }
}

/// Slug for a new post: the title's slug, suffixed when already taken.
async fn unique_slug(state: &AppState, title: &str) -> AppResult<String> {
    let base = slugify(title);
    if state.repos.posts.find_by_slug(&base).await?.is_none() {
        return Ok(base);
    }
    Ok(suffixed(&base))
}

fn suffixed(base: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{base}-{}", &id[..8])
}

/// Load a post the caller may modify.
async fn owned_post(state: &AppState, session: &CurrentSession, id: Uuid) -> AppResult<Post> {
    // The caller's claims are only fresh while their row exists.
    session.user(state).await?;

    let post = state
        .repos
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post '{id}' not found")))?;

    if !session.can_modify(post.author_id) {
        tracing::warn!(post_id = %id, user_id = %session.user_id(), "Post modification denied");
        return Err(AppError::Forbidden);
    }

    Ok(post)
}

/// GET /api/articles/{slug}
pub async fn get_article(
    state: web::Data<AppState>,
    slug: web::Path<String>,
    OptionalSession(session): OptionalSession,
) -> AppResult<HttpResponse> {
    let slug = slug.into_inner();
    let detail = state
        .repos
        .posts
        .find_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article '{slug}' not found")))?;

    let post_id = detail.post.id;
    let mut article = views::article(detail);
    if let Some(session) = session {
        article.bookmarked = Some(
            state
                .repos
                .bookmarks
                .exists(session.user_id(), post_id)
                .await?,
        );
    }

    Ok(HttpResponse::Ok().json(article))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    session: CurrentSession,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let (draft, tags) = draft(body.into_inner());
    draft.validate()?;

    let author = session.user(&state).await?;
    let slug = unique_slug(&state, &draft.title).await?;
    let post = Post::new(author.id, slug, draft.clone())?;

    let saved = match state.repos.posts.insert_with_tags(post.clone(), &tags).await {
        Ok(saved) => saved,
        // Lost a race for the slug: take a suffixed one.
        Err(RepoError::Constraint(_)) => {
            let retry = Post::new(author.id, suffixed(&post.slug), draft)?;
            state.repos.posts.insert_with_tags(retry, &tags).await?
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(post_id = %saved.post.id, slug = %saved.post.slug, "Post created");

    Ok(HttpResponse::Created().json(views::written_post(
        saved.post,
        views::author(&author),
        saved.tags,
    )))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    session: CurrentSession,
    id: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = owned_post(&state, &session, id.into_inner()).await?;

    let (draft, tags) = draft(body.into_inner());
    post.apply(draft)?;

    let saved = state.repos.posts.update_with_tags(post, &tags).await?;

    let author = match state.repos.users.find_by_id(saved.post.author_id).await? {
        Some(user) => views::author(&user),
        None => session_author(&session),
    };

    tracing::info!(post_id = %saved.post.id, "Post updated");

    Ok(HttpResponse::Ok().json(views::written_post(saved.post, author, saved.tags)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    session: CurrentSession,
    id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = owned_post(&state, &session, id.into_inner()).await?;

    state.repos.posts.delete(post.id).await?;

    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixed_slug_shape() {
        let slug = suffixed("hello-world");
        let (base, suffix) = slug.rsplit_once('-').unwrap();

        assert_eq!(base, "hello-world");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_draft_normalizes_tags_and_blanks() {
        let (draft, tags) = draft(PostRequest {
            title: "Title".into(),
            description: Some("  ".into()),
            content: "Body".into(),
            banner_image: None,
            published: true,
            tags: vec!["Rust".into(), "rust".into(), "Web Dev".into()],
        });

        assert!(draft.description.is_none());
        assert_eq!(tags, vec!["rust", "web-dev"]);
    }
}

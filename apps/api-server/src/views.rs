//! Domain to response mapping.

use devconnect_core::domain::{
    BookmarkWithPost, CommentWithAuthor, Post, PostDetail, PostWithTags, Tag, User,
};
use devconnect_core::services::Session;
use devconnect_shared::dto::{
    AuthorResponse, BookmarkResponse, CommentResponse, DeveloperResponse, PostResponse,
    SessionResponse, SessionUserResponse, TagResponse,
};

pub fn session(session: &Session) -> SessionResponse {
    SessionResponse {
        user: SessionUserResponse {
            id: session.user.id,
            name: session.user.name.clone(),
            email: session.user.email.clone(),
            image: session.user.image.clone(),
            role: session.user.role.to_string(),
        },
        expires: session.expires,
    }
}

pub fn author(user: &User) -> AuthorResponse {
    AuthorResponse {
        id: user.id,
        name: user.name.clone(),
        image: user.image.clone(),
    }
}

pub fn developer(user: User) -> DeveloperResponse {
    DeveloperResponse {
        id: user.id,
        role: user.role.to_string(),
        name: user.name,
        image: user.image,
        bio: user.bio,
    }
}

pub fn tag(tag: Tag) -> TagResponse {
    TagResponse {
        id: tag.id,
        name: tag.name,
        slug: tag.slug,
    }
}

fn post_with(
    post: Post,
    content: bool,
    author: Option<AuthorResponse>,
    tags: Vec<Tag>,
) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        description: post.description,
        slug: post.slug,
        content: content.then_some(post.content),
        banner_image: post.banner_image,
        published: post.published,
        read_time: post.read_time,
        author,
        tags: tags.into_iter().map(tag).collect(),
        bookmarked: None,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// Full article, body included.
pub fn article(detail: PostDetail) -> PostResponse {
    let author = author(&detail.author);
    post_with(detail.post, true, Some(author), detail.tags)
}

/// Listing entry: no body.
pub fn post_summary(detail: PostDetail) -> PostResponse {
    let author = author(&detail.author);
    post_with(detail.post, false, Some(author), detail.tags)
}

/// A post whose author is implied by context (the caller's own posts).
pub fn own_post(post: PostWithTags) -> PostResponse {
    post_with(post.post, false, None, post.tags)
}

/// A post that was just written, returned with its body.
pub fn written_post(post: Post, author: AuthorResponse, tags: Vec<Tag>) -> PostResponse {
    post_with(post, true, Some(author), tags)
}

pub fn comment(entry: CommentWithAuthor) -> CommentResponse {
    CommentResponse {
        id: entry.comment.id,
        content: entry.comment.content,
        author: author(&entry.author),
        created_at: entry.comment.created_at,
    }
}

pub fn bookmark(entry: BookmarkWithPost) -> BookmarkResponse {
    BookmarkResponse {
        id: entry.bookmark.id,
        post_id: entry.bookmark.post_id,
        created_at: entry.bookmark.created_at,
        post: Some(post_summary(entry.post)),
    }
}

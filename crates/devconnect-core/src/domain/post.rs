use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Tag, User};
use crate::error::DomainError;

/// Words per minute used for the read-time estimate.
const WORDS_PER_MINUTE: usize = 200;

/// Post entity - an article written by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub content: String,
    pub banner_image: Option<String>,
    pub published: bool,
    /// Estimated minutes to read.
    pub read_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author-supplied fields of a post.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub banner_image: Option<String>,
    pub published: bool,
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".to_string()));
        }
        if self.content.trim().is_empty() {
            return Err(DomainError::Validation("Content is required".to_string()));
        }
        Ok(())
    }
}

impl Post {
    /// Create a new post under `slug`. The slug is fixed from here on.
    pub fn new(author_id: Uuid, slug: String, draft: PostDraft) -> Result<Self, DomainError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            author_id,
            read_time: estimate_read_time(&draft.content),
            title: draft.title.trim().to_string(),
            description: draft.description,
            slug,
            content: draft.content,
            banner_image: draft.banner_image,
            published: draft.published,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply an edit. Everything but the slug, author and creation time may change.
    pub fn apply(&mut self, draft: PostDraft) -> Result<(), DomainError> {
        draft.validate()?;
        self.read_time = estimate_read_time(&draft.content);
        self.title = draft.title.trim().to_string();
        self.description = draft.description;
        self.content = draft.content;
        self.banner_image = draft.banner_image;
        self.published = draft.published;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// A post with its tags, as listed on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithTags {
    pub post: Post,
    pub tags: Vec<Tag>,
}

/// A post with its author and tags, as shown on article and tag pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: User,
    pub tags: Vec<Tag>,
}

/// Derive a URL-safe slug from a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug.to_string()
    }
}

/// Estimate reading time in whole minutes, never less than one.
pub fn estimate_read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust & WebAssembly in 2024  "), "rust-webassembly-in-2024");
        assert_eq!(slugify("???"), "post");
    }

    #[test]
    fn test_read_time() {
        assert_eq!(estimate_read_time(""), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(200)), 1);
        assert_eq!(estimate_read_time(&"word ".repeat(201)), 2);
    }

    #[test]
    fn test_new_post_requires_title_and_content() {
        let author = Uuid::new_v4();
        assert!(Post::new(author, "s".into(), draft(" ", "body")).is_err());
        assert!(Post::new(author, "s".into(), draft("Title", "")).is_err());

        let post = Post::new(author, "title".into(), draft(" Title ", "body")).unwrap();
        assert_eq!(post.title, "Title");
        assert_eq!(post.read_time, 1);
        assert!(post.is_owned_by(author));
    }

    #[test]
    fn test_apply_keeps_slug() {
        let mut post = Post::new(Uuid::new_v4(), "first".into(), draft("First", "a")).unwrap();
        post.apply(draft("Renamed", "b")).unwrap();
        assert_eq!(post.slug, "first");
        assert_eq!(post.title, "Renamed");
    }
}

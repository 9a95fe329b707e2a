use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;
use crate::error::DomainError;

/// Comment entity - a reply left on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a comment. Blank content is rejected.
    pub fn new(post_id: Uuid, author_id: Uuid, content: &str) -> Result<Self, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Validation("Comment cannot be empty".to_string()));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            content: content.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// A comment joined with its author for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    pub comment: Comment,
    pub author: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_comment_rejected() {
        assert!(Comment::new(Uuid::new_v4(), Uuid::new_v4(), "  \n ").is_err());
        let c = Comment::new(Uuid::new_v4(), Uuid::new_v4(), " nice post ").unwrap();
        assert_eq!(c.content, "nice post");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PostDetail;

/// Bookmark entity - a user saving a post. Unique per (user, post).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(user_id: Uuid, post_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}

/// A bookmark with the bookmarked post, its author and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkWithPost {
    pub bookmark: Bookmark,
    pub post: PostDetail,
}

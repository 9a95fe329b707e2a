use std::sync::Arc;

use devconnect_core::ports::{
    BookmarkRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};

use super::memory::InMemoryStore;

/// Every repository the application needs, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub bookmarks: Arc<dyn BookmarkRepository>,
}

impl Repositories {
    /// All repositories share one in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            tags: store.clone(),
            comments: store.clone(),
            bookmarks: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: sea_orm::DbConn) -> Self {
        use super::postgres_repo::{
            PostgresBookmarkRepository, PostgresCommentRepository, PostgresPostRepository,
            PostgresTagRepository, PostgresUserRepository,
        };

        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            tags: Arc::new(PostgresTagRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            bookmarks: Arc::new(PostgresBookmarkRepository::new(db)),
        }
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Bookmark, BookmarkWithPost, Comment, CommentWithAuthor, Post, PostDetail, PostWithTags,
    TagWithPosts, User,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Dependent rows go with it.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Developer directory listing, ordered by name.
    async fn list(&self) -> Result<Vec<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Find a post by slug regardless of its published flag.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Find a published post by slug, with author and tags.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, RepoError>;

    /// All posts of an author with their tags, most recently updated first.
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<PostWithTags>, RepoError>;

    /// Insert a post and link its tags as one unit of work.
    ///
    /// Tags are matched by slug and created when missing; the returned tags
    /// keep input order. Nothing is written when any step fails.
    async fn insert_with_tags(
        &self,
        post: Post,
        tags: &[String],
    ) -> Result<PostWithTags, RepoError>;

    /// Overwrite a post and replace its tag set as one unit of work.
    async fn update_with_tags(
        &self,
        post: Post,
        tags: &[String],
    ) -> Result<PostWithTags, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Find a tag by slug with its published posts, newest first.
    async fn find_by_slug_with_posts(&self, slug: &str) -> Result<Option<TagWithPosts>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post with their authors, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError>;
}

/// Bookmark repository.
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Bookmark a post. Returns the existing bookmark when the pair is already saved.
    async fn add(&self, user_id: Uuid, post_id: Uuid) -> Result<Bookmark, RepoError>;

    /// Remove a bookmark. Returns whether one existed.
    async fn remove(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError>;

    async fn exists(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError>;

    /// A user's bookmarks with post, author and tags, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookmarkWithPost>, RepoError>;
}

//! In-memory store - used when no database is configured, and in tests.
//!
//! Mirrors the relational schema closely enough for the request flows:
//! unique email, slug and bookmark pair, foreign keys checked on insert, and
//! cascading deletes from users and posts. Data is lost on process restart.

use std::cmp::Reverse;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use devconnect_core::domain::{
    Bookmark, BookmarkWithPost, Comment, CommentWithAuthor, Post, PostDetail, PostWithTags, Tag,
    TagWithPosts, User,
};
use devconnect_core::error::RepoError;
use devconnect_core::ports::{
    BaseRepository, BookmarkRepository, CommentRepository, PostRepository, TagRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    tags: Vec<Tag>,
    post_tags: Vec<(Uuid, Uuid)>,
    comments: Vec<Comment>,
    bookmarks: Vec<Bookmark>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn post(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn tags_of(&self, post_id: Uuid) -> Vec<Tag> {
        self.post_tags
            .iter()
            .filter(|(p, _)| *p == post_id)
            .filter_map(|(_, t)| self.tags.iter().find(|tag| tag.id == *t).cloned())
            .collect()
    }

    fn detail(&self, post: &Post) -> Option<PostDetail> {
        let author = self.user(post.author_id)?.clone();
        Some(PostDetail {
            post: post.clone(),
            author,
            tags: self.tags_of(post.id),
        })
    }

    fn insert_post(&mut self, post: &Post) -> Result<(), RepoError> {
        if self.user(post.author_id).is_none() {
            return Err(RepoError::Constraint("posts_author_id_fkey".to_string()));
        }
        if self
            .posts
            .iter()
            .any(|p| p.id == post.id || p.slug == post.slug)
        {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }
        self.posts.push(post.clone());
        Ok(())
    }

    fn update_post(&mut self, post: &Post) -> Result<(), RepoError> {
        if self
            .posts
            .iter()
            .any(|p| p.id != post.id && p.slug == post.slug)
        {
            return Err(RepoError::Constraint("posts_slug_key".to_string()));
        }
        let row = self
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *row = post.clone();
        Ok(())
    }

    /// Replace the tag links of an existing post, creating missing tags.
    fn link_tags(&mut self, post_id: Uuid, tokens: &[String]) -> Vec<Tag> {
        self.post_tags.retain(|(p, _)| *p != post_id);

        let mut linked = Vec::with_capacity(tokens.len());
        for token in tokens {
            let tag = match self.tags.iter().find(|t| &t.slug == token) {
                Some(tag) => tag.clone(),
                None => {
                    let tag = Tag::from_normalized(token.clone());
                    self.tags.push(tag.clone());
                    tag
                }
            };
            self.post_tags.push((post_id, tag.id));
            linked.push(tag);
        }
        linked
    }

    fn delete_post(&mut self, id: Uuid) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post_id != id);
        self.bookmarks.retain(|b| b.post_id != id);
        self.post_tags.retain(|(p, _)| *p != id);
        self.posts.len() != before
    }

    fn delete_user(&mut self, id: Uuid) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != id);
        let owned: Vec<Uuid> = self
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            self.delete_post(post_id);
        }
        self.comments.retain(|c| c.author_id != id);
        self.bookmarks.retain(|b| b.user_id != id);
        self.users.len() != before
    }
}

/// Sort newest-first by `key`; on ties the later insertion wins.
fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.reverse();
    items.sort_by_key(|item| Reverse(key(item)));
    items
}

/// In-memory implementation of every repository port, behind one async RwLock.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.user(id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.id == user.id || u.email == user.email)
        {
            return Err(RepoError::Constraint("users_email_key".to_string()));
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepoError::Constraint("users_email_key".to_string()));
        }
        let row = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *row = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.tables.write().await.delete_user(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let mut users = self.tables.read().await.users.clone();
        users.sort_by(|a, b| {
            (a.name.is_none(), &a.name, &a.email).cmp(&(b.name.is_none(), &b.name, &b.email))
        });
        Ok(users)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.post(id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.tables.write().await.insert_post(&post)?;
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.tables.write().await.update_post(&post)?;
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        if self.tables.write().await.delete_post(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .find(|p| p.slug == slug && p.published)
            .and_then(|p| tables.detail(p)))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<PostWithTags>, RepoError> {
        let tables = self.tables.read().await;
        let posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();

        Ok(newest_first(posts, |p| p.updated_at)
            .into_iter()
            .map(|post| PostWithTags {
                tags: tables.tags_of(post.id),
                post,
            })
            .collect())
    }

    async fn insert_with_tags(
        &self,
        post: Post,
        tokens: &[String],
    ) -> Result<PostWithTags, RepoError> {
        let mut tables = self.tables.write().await;
        tables.insert_post(&post)?;
        let tags = tables.link_tags(post.id, tokens);
        Ok(PostWithTags { post, tags })
    }

    async fn update_with_tags(
        &self,
        post: Post,
        tokens: &[String],
    ) -> Result<PostWithTags, RepoError> {
        let mut tables = self.tables.write().await;
        tables.update_post(&post)?;
        let tags = tables.link_tags(post.id, tokens);
        Ok(PostWithTags { post, tags })
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug_with_posts(&self, slug: &str) -> Result<Option<TagWithPosts>, RepoError> {
        let tables = self.tables.read().await;
        let Some(tag) = tables.tags.iter().find(|t| t.slug == slug).cloned() else {
            return Ok(None);
        };

        let posts: Vec<Post> = tables
            .post_tags
            .iter()
            .filter(|(_, t)| *t == tag.id)
            .filter_map(|(p, _)| tables.post(*p))
            .filter(|p| p.published)
            .cloned()
            .collect();

        let posts = newest_first(posts, |p| p.created_at)
            .iter()
            .filter_map(|p| tables.detail(p))
            .collect();

        Ok(Some(TagWithPosts { tag, posts }))
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.post(comment.post_id).is_none() || tables.user(comment.author_id).is_none() {
            return Err(RepoError::Constraint("comments_fkey".to_string()));
        }
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or(RepoError::NotFound)?;
        *row = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        if tables.comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(comments
            .into_iter()
            .filter_map(|c| {
                tables.user(c.author_id).map(|author| CommentWithAuthor {
                    comment: c.clone(),
                    author: author.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryStore {
    async fn add(&self, user_id: Uuid, post_id: Uuid) -> Result<Bookmark, RepoError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .bookmarks
            .iter()
            .find(|b| b.user_id == user_id && b.post_id == post_id)
        {
            return Ok(existing.clone());
        }
        if tables.post(post_id).is_none() || tables.user(user_id).is_none() {
            return Err(RepoError::Constraint("bookmarks_fkey".to_string()));
        }

        let bookmark = Bookmark::new(user_id, post_id);
        tables.bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn remove(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.bookmarks.len();
        tables
            .bookmarks
            .retain(|b| !(b.user_id == user_id && b.post_id == post_id));
        Ok(tables.bookmarks.len() != before)
    }

    async fn exists(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookmarks
            .iter()
            .any(|b| b.user_id == user_id && b.post_id == post_id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookmarkWithPost>, RepoError> {
        let tables = self.tables.read().await;
        let bookmarks: Vec<Bookmark> = tables
            .bookmarks
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();

        Ok(newest_first(bookmarks, |b| b.created_at)
            .into_iter()
            .filter_map(|bookmark| {
                let post = tables.post(bookmark.post_id)?;
                let post = tables.detail(post)?;
                Some(BookmarkWithPost { bookmark, post })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devconnect_core::domain::PostDraft;

    async fn seed_user(store: &InMemoryStore, email: &str) -> User {
        let user = User::with_password(email.to_string(), Some("Dev".into()), "h".into());
        UserRepository::insert(store, user).await.unwrap()
    }

    fn draft_post(author: Uuid, slug: &str, published: bool) -> Post {
        Post::new(
            author,
            slug.to_string(),
            PostDraft {
                title: slug.to_string(),
                content: "body".to_string(),
                published,
                ..Default::default()
            },
        )
        .unwrap()
    }

    async fn seed_post(store: &InMemoryStore, author: Uuid, slug: &str, published: bool) -> Post {
        PostRepository::insert(store, draft_post(author, slug, published))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unique_email() {
        let store = InMemoryStore::new();
        seed_user(&store, "a@dev.io").await;
        let dup = User::with_password("a@dev.io".into(), None, "h".into());
        assert!(matches!(
            UserRepository::insert(&store, dup).await.unwrap_err(),
            RepoError::Constraint(_)
        ));
    }

    #[tokio::test]
    async fn test_unpublished_post_hidden_by_slug() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "a@dev.io").await;
        seed_post(&store, user.id, "draft", false).await;
        seed_post(&store, user.id, "live", true).await;

        assert!(store.find_published_by_slug("draft").await.unwrap().is_none());
        let live = store.find_published_by_slug("live").await.unwrap().unwrap();
        assert_eq!(live.author.id, user.id);
        assert!(store.find_by_slug("draft").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_tagged_posts_share_tags() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "a@dev.io").await;

        let first = store
            .insert_with_tags(draft_post(user.id, "one", true), &["rust".into()])
            .await
            .unwrap();
        let second = store
            .insert_with_tags(draft_post(user.id, "two", true), &["rust".into(), "web".into()])
            .await
            .unwrap();

        assert_eq!(first.tags[0].id, second.tags[0].id);
        let page = store.find_by_slug_with_posts("rust").await.unwrap().unwrap();
        assert_eq!(page.posts.len(), 2);
        assert_eq!(page.posts[0].post.id, second.post.id);
    }

    #[tokio::test]
    async fn test_rejected_post_leaves_no_tags() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "a@dev.io").await;
        seed_post(&store, user.id, "taken", true).await;

        let err = store
            .insert_with_tags(draft_post(user.id, "taken", true), &["fresh".into()])
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
        assert!(store.find_by_slug_with_posts("fresh").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_with_tags_replaces_links() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "a@dev.io").await;
        let saved = store
            .insert_with_tags(draft_post(user.id, "one", true), &["rust".into()])
            .await
            .unwrap();

        let mut post = saved.post;
        post.title = "Renamed".to_string();
        let updated = store.update_with_tags(post, &["web".into()]).await.unwrap();

        assert_eq!(updated.post.title, "Renamed");
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].slug, "web");
        let rust = store.find_by_slug_with_posts("rust").await.unwrap().unwrap();
        assert!(rust.posts.is_empty());
    }

    #[tokio::test]
    async fn test_post_delete_cascades() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "a@dev.io").await;
        let post = store
            .insert_with_tags(draft_post(user.id, "one", true), &["rust".into()])
            .await
            .unwrap()
            .post;
        let comment = Comment::new(post.id, user.id, "hi").unwrap();
        CommentRepository::insert(&store, comment).await.unwrap();
        store.add(user.id, post.id).await.unwrap();

        PostRepository::delete(&store, post.id).await.unwrap();

        assert!(store.list_for_post(post.id).await.unwrap().is_empty());
        assert!(store.list_for_user(user.id).await.unwrap().is_empty());
        assert!(store.tables.read().await.post_tags.is_empty());
    }

    #[tokio::test]
    async fn test_bookmark_is_unique_per_pair() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "a@dev.io").await;
        let post = seed_post(&store, user.id, "one", true).await;

        let first = store.add(user.id, post.id).await.unwrap();
        let second = store.add(user.id, post.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.list_for_user(user.id).await.unwrap().len(), 1);
        assert!(store.remove(user.id, post.id).await.unwrap());
        assert!(!store.remove(user.id, post.id).await.unwrap());
    }
}

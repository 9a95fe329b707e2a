//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbConn, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use devconnect_core::domain::{
    Bookmark, BookmarkWithPost, CommentWithAuthor, Post, PostDetail, PostWithTags, Tag,
    TagWithPosts, User,
};
use devconnect_core::error::RepoError;
use devconnect_core::ports::{
    BookmarkRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};

use super::entity::bookmark::{self, Entity as BookmarkEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL bookmark repository.
pub type PostgresBookmarkRepository = PostgresBaseRepository<BookmarkEntity>;

/// Mask an email for logging to avoid PII in logs.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            if local.chars().count() > 1 {
                format!("{first}***@{domain}")
            } else {
                format!("***@{domain}")
            }
        }
        None => "***".to_string(),
    }
}

/// Attach authors and tags to a page of posts, keeping their order.
/// Posts whose author row is missing are dropped.
async fn with_relations(db: &DbConn, posts: Vec<post::Model>) -> Result<Vec<PostDetail>, DbErr> {
    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let authors = posts.load_one(UserEntity, db).await?;
    let tags = posts.load_many_to_many(TagEntity, PostTagEntity, db).await?;

    Ok(posts
        .into_iter()
        .zip(authors)
        .zip(tags)
        .filter_map(|((post, author), tags)| {
            author.map(|author| PostDetail {
                post: post.into(),
                author: author.into(),
                tags: tags.into_iter().map(Into::into).collect(),
            })
        })
        .collect())
}

async fn find_tag(txn: &DatabaseTransaction, slug: &str) -> Result<Option<tag::Model>, RepoError> {
    TagEntity::find()
        .filter(tag::Column::Slug.eq(slug))
        .one(txn)
        .await
        .map_err(query_error)
}

/// Replace the tag links of a post, creating missing tags. Returns the tags
/// in input order.
async fn link_tags(
    txn: &DatabaseTransaction,
    post_id: Uuid,
    tokens: &[String],
) -> Result<Vec<Tag>, RepoError> {
    PostTagEntity::delete_many()
        .filter(post_tag::Column::PostId.eq(post_id))
        .exec(txn)
        .await
        .map_err(write_error)?;

    let mut linked = Vec::with_capacity(tokens.len());
    for token in tokens {
        let model = match find_tag(txn, token).await? {
            Some(model) => model,
            None => {
                // Another writer may create the same tag first; keep theirs.
                TagEntity::insert(tag::ActiveModel::from(Tag::from_normalized(token.clone())))
                    .on_conflict(OnConflict::column(tag::Column::Slug).do_nothing().to_owned())
                    .exec_without_returning(txn)
                    .await
                    .map_err(write_error)?;
                find_tag(txn, token).await?.ok_or(RepoError::NotFound)?
            }
        };

        post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(model.id),
        }
        .insert(txn)
        .await
        .map_err(write_error)?;

        linked.push(model.into());
    }

    Ok(linked)
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .order_by_asc(user::Column::Name)
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PostDetail>, RepoError> {
        let Some(model) = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Published.eq(true))
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        let author = model
            .find_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .ok_or_else(|| RepoError::Query(format!("post {} has no author", model.id)))?;
        let tags = model
            .find_related(TagEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(Some(PostDetail {
            post: model.into(),
            author: author.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }))
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<PostWithTags>, RepoError> {
        let posts = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::UpdatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let tags = posts
            .load_many_to_many(TagEntity, PostTagEntity, &self.db)
            .await
            .map_err(query_error)?;

        Ok(posts
            .into_iter()
            .zip(tags)
            .map(|(post, tags)| PostWithTags {
                post: post.into(),
                tags: tags.into_iter().map(Into::into).collect(),
            })
            .collect())
    }

    async fn insert_with_tags(
        &self,
        post: Post,
        tags: &[String],
    ) -> Result<PostWithTags, RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        let model = post::ActiveModel::from(post)
            .insert(&txn)
            .await
            .map_err(write_error)?;
        let tags = link_tags(&txn, model.id, tags).await?;

        txn.commit().await.map_err(query_error)?;

        Ok(PostWithTags {
            post: model.into(),
            tags,
        })
    }

    async fn update_with_tags(
        &self,
        post: Post,
        tags: &[String],
    ) -> Result<PostWithTags, RepoError> {
        let txn = self.db.begin().await.map_err(query_error)?;

        let model = post::ActiveModel::from(post)
            .update(&txn)
            .await
            .map_err(write_error)?;
        let tags = link_tags(&txn, model.id, tags).await?;

        txn.commit().await.map_err(query_error)?;

        Ok(PostWithTags {
            post: model.into(),
            tags,
        })
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug_with_posts(&self, slug: &str) -> Result<Option<TagWithPosts>, RepoError> {
        let Some(model) = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        let posts = model
            .find_related(PostEntity)
            .filter(post::Column::Published.eq(true))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let posts = with_relations(&self.db, posts)
            .await
            .map_err(query_error)?;

        Ok(Some(TagWithPosts {
            tag: model.into(),
            posts,
        }))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(rows
            .into_iter()
            .filter_map(|(comment, author)| {
                author.map(|author| CommentWithAuthor {
                    comment: comment.into(),
                    author: author.into(),
                })
            })
            .collect())
    }
}

impl PostgresBookmarkRepository {
    async fn find_pair(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Bookmark>, RepoError> {
        let result = BookmarkEntity::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl BookmarkRepository for PostgresBookmarkRepository {
    async fn add(&self, user_id: Uuid, post_id: Uuid) -> Result<Bookmark, RepoError> {
        if let Some(existing) = self.find_pair(user_id, post_id).await? {
            return Ok(existing);
        }

        let active = bookmark::ActiveModel::from(Bookmark::new(user_id, post_id));
        match active.insert(&self.db).await.map_err(write_error) {
            Ok(model) => Ok(model.into()),
            // A concurrent request saved the same pair first.
            Err(RepoError::Constraint(_)) => self
                .find_pair(user_id, post_id)
                .await?
                .ok_or(RepoError::NotFound),
            Err(e) => Err(e),
        }
    }

    async fn remove(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        let result = BookmarkEntity::delete_many()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await
            .map_err(write_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn exists(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.find_pair(user_id, post_id).await?.is_some())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<BookmarkWithPost>, RepoError> {
        let bookmarks = BookmarkEntity::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        if bookmarks.is_empty() {
            return Ok(Vec::new());
        }

        let posts = bookmarks
            .load_one(PostEntity, &self.db)
            .await
            .map_err(query_error)?;

        let (bookmarks, posts): (Vec<_>, Vec<_>) = bookmarks
            .into_iter()
            .zip(posts)
            .filter_map(|(bookmark, post)| post.map(|post| (bookmark, post)))
            .unzip();

        let details = with_relations(&self.db, posts)
            .await
            .map_err(query_error)?;

        // `with_relations` drops authorless posts; match the survivors back by id.
        Ok(details
            .into_iter()
            .filter_map(|detail| {
                bookmarks
                    .iter()
                    .find(|b| b.post_id == detail.post.id)
                    .map(|b| BookmarkWithPost {
                        bookmark: b.clone().into(),
                        post: detail,
                    })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("ada@dev.io"), "a***@dev.io");
        assert_eq!(mask_email("a@dev.io"), "***@dev.io");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}

//! Domain entities - the core business objects.

mod bookmark;
mod comment;
mod post;
pub mod tag;
mod user;

pub use bookmark::{Bookmark, BookmarkWithPost};
pub use comment::{Comment, CommentWithAuthor};
pub use post::{Post, PostDetail, PostDraft, PostWithTags, estimate_read_time, slugify};
pub use tag::{MAX_TAGS, Tag, TagWithPosts, add_tag, normalize_tag, normalize_tags, remove_tag};
pub use user::{Role, User};

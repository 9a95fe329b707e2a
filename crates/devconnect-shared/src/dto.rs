//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Credential sign-in. Missing fields deserialize as empty and fail authorization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// External provider sign-in: the access token the client obtained from the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalSignInRequest {
    pub access_token: String,
}

/// Response containing a session token. The same token is set as a cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub session: SessionResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUserResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub role: String,
}

/// The resolved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: SessionUserResponse,
    pub expires: DateTime<Utc>,
}

/// Public view of a user attached to posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Developer directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Create or update an article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub published: bool,
    /// Free-text tags; normalized server-side, at most five kept.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An article. `author` is omitted on the dashboard, where it is the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub banner_image: Option<String>,
    pub published: bool,
    pub read_time: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorResponse>,
    pub tags: Vec<TagResponse>,
    /// Whether the signed-in reader has bookmarked the article. Absent for anonymous reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarked: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPageResponse {
    pub tag: TagResponse,
    pub posts: Vec<PostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub author: AuthorResponse,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<PostResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub posts: Vec<PostResponse>,
    pub bookmarks: Vec<BookmarkResponse>,
}

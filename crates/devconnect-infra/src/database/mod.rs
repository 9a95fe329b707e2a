//! Persistence: sea-orm repositories over PostgreSQL and an in-memory fallback.

mod connections;
mod memory;
mod repositories;

#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
#[cfg(feature = "postgres")]
pub use connections::connect;
pub use memory::InMemoryStore;
pub use repositories::Repositories;

#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresBookmarkRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresTagRepository, PostgresUserRepository,
};

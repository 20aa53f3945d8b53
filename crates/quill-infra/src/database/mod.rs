//! Persistence: SeaORM repositories, connection management, and the in-memory fallback store.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod base;
#[cfg(feature = "postgres")]
mod category_repo;
#[cfg(feature = "postgres")]
mod post_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
pub use memory::InMemoryBlogStore;

#[cfg(feature = "postgres")]
pub use connections::DatabaseConnections;
#[cfg(feature = "postgres")]
pub use category_repo::SeaOrmCategoryRepository;
#[cfg(feature = "postgres")]
pub use post_repo::SeaOrmPostRepository;

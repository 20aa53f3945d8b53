//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains database, object storage, and token verification integrations.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory store and filesystem storage only
//! - `postgres` - PostgreSQL (and SQLite) persistence via SeaORM
//! - `auth` - JWT bearer token verification
//! - `rate-limit` - Rate limiting via governor

pub mod database;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryBlogStore};
pub use storage::{InMemoryObjectStorage, LocalObjectStorage};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConnections, SeaOrmCategoryRepository, SeaOrmPostRepository};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenVerifier};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod rate_limit;
mod repository;
mod storage;

pub use auth::{AuthError, TokenClaims, TokenVerifier};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{CategoryRepository, PostRepository};
pub use storage::{ObjectStorage, StorageError};

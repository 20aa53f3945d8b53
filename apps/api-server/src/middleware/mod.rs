//! Middleware modules.

pub mod auth;
pub mod error;
pub mod rate_limit;

pub use auth::Identity;
pub use error::{AppError, AppResult};
pub use rate_limit::RateLimitMiddleware;

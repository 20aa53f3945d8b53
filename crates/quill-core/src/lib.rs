//! # Quill Core
//!
//! The domain layer of the Quill blog backend.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod sync;
pub mod upload;

pub use error::{DomainError, RepoError};
pub use sync::CategorySync;
pub use upload::{ThumbnailUploader, UploadedThumbnail};

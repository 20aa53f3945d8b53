//! # Quill Client
//!
//! Typed access to the Quill HTTP API for front ends and tooling.
//!
//! - [`BlogClient`] - one method per route, returning the shared DTOs.
//! - [`Credential`] - the bearer token, passed explicitly to every admin call.
//! - [`Fetcher`] - cached, generation-checked loading state for list and detail views.

mod client;
mod credential;
mod error;
mod fetcher;

pub use client::BlogClient;
pub use credential::Credential;
pub use error::ClientError;
pub use fetcher::{FetchKey, FetchState, Fetcher};

//! Object storage port - where thumbnail images live.

use async_trait::async_trait;
use bytes::Bytes;

/// Object storage trait - abstraction over blob backends (filesystem, in-memory, S3-like).
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`, replacing nothing: keys are expected to be fresh.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// Resolve the publicly reachable URL for a stored key.
    async fn public_url(&self, key: &str) -> Result<String, StorageError>;

    /// Remove a stored object. Missing objects are treated as success.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("uploaded file is empty")]
    EmptyPayload,

    #[error("storage backend error: {0}")]
    Backend(String),
}

//! In-memory object storage - used in tests and when no storage root is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use quill_core::ports::{ObjectStorage, StorageError};

struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// Object storage kept in a `HashMap` behind an async `RwLock`.
pub struct InMemoryObjectStorage {
    objects: RwLock<HashMap<String, StoredObject>>,
    public_base_url: String,
}

impl InMemoryObjectStorage {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a stored object with its content type.
    pub async fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| (o.data.clone(), o.content_type.clone()))
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        if data.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        if !self.objects.read().await.contains_key(key) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}

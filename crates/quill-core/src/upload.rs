//! Thumbnail upload: store the file under a fresh key, then resolve its public URL.

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use crate::ports::{ObjectStorage, StorageError};

/// Prefix under which thumbnails are stored.
pub const THUMBNAIL_PREFIX: &str = "private";

/// A stored thumbnail, ready to be attached to a post draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedThumbnail {
    pub key: String,
    pub url: String,
}

/// Uploads thumbnail images to object storage.
#[derive(Clone)]
pub struct ThumbnailUploader {
    storage: Arc<dyn ObjectStorage>,
}

impl ThumbnailUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }

    /// Store `data` under a newly generated key and return the key with its public URL.
    ///
    /// If the URL cannot be resolved the stored object is removed again, so a
    /// failed upload never leaves an unreferenced blob behind.
    pub async fn upload(
        &self,
        data: Bytes,
        content_type: &str,
    ) -> Result<UploadedThumbnail, StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        let key = format!("{}/{}", THUMBNAIL_PREFIX, Uuid::new_v4());
        self.storage.put(&key, data, content_type).await?;

        match self.storage.public_url(&key).await {
            Ok(url) => {
                tracing::debug!(key = %key, "Thumbnail stored");
                Ok(UploadedThumbnail { key, url })
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Resolving thumbnail URL failed, removing object");
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::error!(key = %key, error = %cleanup, "Orphaned thumbnail could not be removed");
                }
                Err(e)
            }
        }
    }
}

//! Filesystem-backed object storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt};

use quill_core::ports::{ObjectStorage, StorageError};

/// Stores objects as files below `root` and serves them from `public_base_url`.
#[derive(Debug)]
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    /// Initialise storage rooted at the provided directory, creating it if necessary.
    pub fn new(root: PathBuf, public_base_url: impl Into<String>) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&root).map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the absolute path for a key, refusing anything that escapes the root.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative.is_absolute()
            || relative
                .components()
                .any(|component| !matches!(component, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        if data.is_empty() {
            return Err(StorageError::EmptyPayload);
        }

        let absolute = self.resolve(key)?;
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Backend(e.to_string()))?;
        }

        let mut file = fs::File::create(&absolute)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if let Err(e) = file.write_all(&data).await {
            drop(file);
            let _ = fs::remove_file(&absolute).await;
            return Err(StorageError::Backend(e.to_string()));
        }
        file.flush()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        tracing::debug!(key, content_type, size = data.len(), "Stored object on disk");
        Ok(())
    }

    async fn public_url(&self, key: &str) -> Result<String, StorageError> {
        let absolute = self.resolve(key)?;
        if !fs::try_exists(&absolute).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let absolute = self.resolve(key)?;
        match fs::remove_file(&absolute).await {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Backend(err.to_string())),
        }
    }
}

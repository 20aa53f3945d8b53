//! Application state - shared across all handlers.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use quill_core::ThumbnailUploader;
use quill_core::ports::{CategoryRepository, ObjectStorage, PostRepository, TokenVerifier};
use quill_infra::{
    DatabaseConnections, InMemoryBlogStore, JwtTokenVerifier, LocalObjectStorage,
    SeaOrmCategoryRepository, SeaOrmPostRepository,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub uploader: ThumbnailUploader,
    pub verifier: Arc<dyn TokenVerifier>,
    pub max_upload_bytes: usize,
    pub db: Option<DatabaseConnections>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Uses the in-memory store only when no database is configured. A configured
    /// database that cannot be reached fails startup.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db = match &config.database {
            Some(db_config) => match DatabaseConnections::init(db_config).await {
                Ok(connections) => {
                    if config.run_migrations {
                        Migrator::up(&connections.main, None).await?;
                        tracing::info!("Schema migrations applied");
                    }
                    Some(connections)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database");
                    return Err(e.into());
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                None
            }
        };

        let (posts, categories) = match &db {
            Some(connections) => {
                let posts: Arc<dyn PostRepository> =
                    Arc::new(SeaOrmPostRepository::new(connections.main.clone()));
                let categories: Arc<dyn CategoryRepository> =
                    Arc::new(SeaOrmCategoryRepository::new(connections.main.clone()));
                (posts, categories)
            }
            None => {
                let store = Arc::new(InMemoryBlogStore::new());
                let posts: Arc<dyn PostRepository> = store.clone();
                let categories: Arc<dyn CategoryRepository> = store;
                (posts, categories)
            }
        };

        let storage: Arc<dyn ObjectStorage> = Arc::new(LocalObjectStorage::new(
            config.storage.root.clone(),
            config.storage.public_base_url.clone(),
        )?);
        tracing::info!(root = %config.storage.root.display(), "Thumbnail storage ready");

        let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtTokenVerifier::new(config.jwt.clone()));

        tracing::info!("Application state initialized");

        Ok(Self {
            db,
            ..Self::from_parts(
                posts,
                categories,
                storage,
                verifier,
                config.max_upload_bytes,
            )
        })
    }

    /// Assemble state from ready-made components, without a database pool.
    pub fn from_parts(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        storage: Arc<dyn ObjectStorage>,
        verifier: Arc<dyn TokenVerifier>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            posts,
            categories,
            uploader: ThumbnailUploader::new(storage),
            verifier,
            max_upload_bytes,
            db: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use quill_infra::{DatabaseConfig, JwtConfig, RateLimitConfig};

    use crate::config::StorageConfig;

    fn config(database: Option<DatabaseConfig>, root: &std::path::Path) -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database,
            run_migrations: false,
            jwt: JwtConfig::default(),
            storage: StorageConfig {
                root: root.to_path_buf(),
                public_base_url: "http://127.0.0.1/uploads".to_string(),
            },
            max_upload_bytes: 1024,
            rate_limit: RateLimitConfig::default(),
            trust_proxy_headers: false,
        }
    }

    #[actix_web::test]
    async fn test_unreachable_database_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let database = DatabaseConfig {
            connect_timeout: Duration::from_secs(1),
            ..DatabaseConfig::new("postgres://u:p@127.0.0.1:1/blog")
        };

        let result = AppState::new(&config(Some(database), dir.path())).await;

        assert!(result.is_err());
    }

    #[actix_web::test]
    async fn test_no_database_uses_in_memory_store() {
        let dir = tempfile::tempdir().unwrap();

        let state = AppState::new(&config(None, dir.path())).await.unwrap();

        assert!(state.db.is_none());
        assert!(state.posts.list().await.unwrap().is_empty());
    }
}

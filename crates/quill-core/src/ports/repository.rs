use async_trait::async_trait;

use crate::domain::{Category, CategoryDraft, CategoryId, Post, PostDraft, PostId};
use crate::error::RepoError;

/// Post repository.
///
/// Every post returned carries its joined categories (id and name only).
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, newest first.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    /// Find a post by its id.
    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError>;

    /// Insert a post and its category associations atomically.
    async fn create(&self, draft: PostDraft) -> Result<PostId, RepoError>;

    /// Replace a post's fields and reconcile its category set atomically.
    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, RepoError>;

    /// Delete a post together with its category associations.
    async fn delete(&self, id: PostId) -> Result<(), RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories, newest first.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepoError>;

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepoError>;

    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> Result<Category, RepoError>;

    /// Delete a category; posts filed under it lose the association.
    async fn delete(&self, id: CategoryId) -> Result<(), RepoError>;
}

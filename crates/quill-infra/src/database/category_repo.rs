//! SeaORM category repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use quill_core::domain::{Category, CategoryDraft, CategoryId};
use quill_core::error::RepoError;
use quill_core::ports::CategoryRepository;

use super::base::{SeaOrmRepository, map_db_err};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};

/// SeaORM category repository.
pub type SeaOrmCategoryRepository = SeaOrmRepository<CategoryEntity>;

#[async_trait]
impl CategoryRepository for SeaOrmCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_desc(category::Column::CreatedAt)
            .order_by_desc(category::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepoError> {
        let result = Self::find_model(&self.db, id).await?;
        Ok(result.map(Into::into))
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepoError> {
        let now = Utc::now();

        let model = category::ActiveModel {
            name: Set(draft.name),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(map_db_err)?;

        tracing::debug!(category_id = model.id, "Created category");
        Ok(model.into())
    }

    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> Result<Category, RepoError> {
        let existing = Self::find_model(&self.db, id)
            .await?
            .ok_or(RepoError::NotFound)?;

        let mut active = existing.into_active_model();
        active.name = Set(draft.name);
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(model.into())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let detached = PostCategoryEntity::delete_many()
            .filter(post_category::Column::CategoryId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        Self::delete_model(&txn, id).await?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(
            category_id = id,
            detached_posts = detached.rows_affected,
            "Deleted category"
        );
        Ok(())
    }
}

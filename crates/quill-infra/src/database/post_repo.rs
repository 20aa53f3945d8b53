//! SeaORM post repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use quill_core::CategorySync;
use quill_core::domain::{CategoryId, Post, PostDraft, PostId};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::base::{SeaOrmRepository, map_db_err};
use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};

/// SeaORM post repository.
pub type SeaOrmPostRepository = SeaOrmRepository<PostEntity>;

impl SeaOrmPostRepository {
    async fn load_post<C>(conn: &C, id: PostId) -> Result<Option<Post>, RepoError>
    where
        C: ConnectionTrait,
    {
        let Some(model) = Self::find_model(conn, id).await? else {
            return Ok(None);
        };

        let categories = model
            .find_related(CategoryEntity)
            .order_by_asc(category::Column::Id)
            .all(conn)
            .await
            .map_err(map_db_err)?;

        Ok(Some(model.into_domain(categories)))
    }

    async fn current_category_ids<C>(conn: &C, id: PostId) -> Result<Vec<CategoryId>, RepoError>
    where
        C: ConnectionTrait,
    {
        let rows = PostCategoryEntity::find()
            .filter(post_category::Column::PostId.eq(id))
            .order_by_asc(post_category::Column::CategoryId)
            .all(conn)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(|row| row.category_id).collect())
    }

    /// Join rows are inserted one at a time; the caller owns the transaction.
    async fn attach_categories<C>(
        conn: &C,
        post_id: PostId,
        category_ids: &[CategoryId],
    ) -> Result<(), RepoError>
    where
        C: ConnectionTrait,
    {
        for category_id in category_ids {
            let link = post_category::ActiveModel {
                post_id: Set(post_id),
                category_id: Set(*category_id),
            };
            PostCategoryEntity::insert(link)
                .exec_without_returning(conn)
                .await
                .map_err(map_db_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let posts = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        let categories = posts
            .load_many_to_many(CategoryEntity, PostCategoryEntity, &self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(count = posts.len(), "Listed posts");

        Ok(posts
            .into_iter()
            .zip(categories)
            .map(|(post, categories)| post.into_domain(categories))
            .collect())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        Self::load_post(&self.db, id).await
    }

    async fn create(&self, draft: PostDraft) -> Result<PostId, RepoError> {
        draft.validate_category_ids()?;

        let txn = self.db.begin().await.map_err(map_db_err)?;
        let now = Utc::now();

        let model = post::ActiveModel {
            title: Set(draft.title),
            content: Set(draft.content),
            thumbnail_image_key: Set(draft.thumbnail_image_key),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;

        Self::attach_categories(&txn, model.id, &draft.category_ids).await?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(
            post_id = model.id,
            categories = draft.category_ids.len(),
            "Created post"
        );
        Ok(model.id)
    }

    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, RepoError> {
        draft.validate_category_ids()?;

        let txn = self.db.begin().await.map_err(map_db_err)?;

        let existing = Self::find_model(&txn, id)
            .await?
            .ok_or(RepoError::NotFound)?;

        let mut active = existing.into_active_model();
        active.title = Set(draft.title);
        active.content = Set(draft.content);
        active.thumbnail_image_key = Set(draft.thumbnail_image_key);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await.map_err(map_db_err)?;

        let current = Self::current_category_ids(&txn, id).await?;
        let plan = CategorySync::plan(&current, &draft.category_ids)?;

        if !plan.to_remove.is_empty() {
            PostCategoryEntity::delete_many()
                .filter(post_category::Column::PostId.eq(id))
                .filter(post_category::Column::CategoryId.is_in(plan.to_remove.clone()))
                .exec(&txn)
                .await
                .map_err(map_db_err)?;
        }
        Self::attach_categories(&txn, id, &plan.to_insert).await?;

        let updated = Self::load_post(&txn, id).await?.ok_or(RepoError::NotFound)?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(
            post_id = id,
            added = plan.to_insert.len(),
            removed = plan.to_remove.len(),
            "Updated post"
        );
        Ok(updated)
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        PostCategoryEntity::delete_many()
            .filter(post_category::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        Self::delete_model(&txn, id).await?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(post_id = id, "Deleted post");
        Ok(())
    }
}

//! In-memory blog store - used when no database is configured, and in tests.
//!
//! Mirrors the SeaORM repositories: ids are generated sequentially, the join
//! set enforces `(post_id, category_id)` uniqueness and foreign keys, and every
//! write either applies completely or not at all.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quill_core::CategorySync;
use quill_core::domain::{
    Category, CategoryDraft, CategoryId, CategorySummary, Post, PostDraft, PostId,
};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, PostRepository};

struct PostRow {
    title: String,
    content: String,
    thumbnail_image_key: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct StoreState {
    last_post_id: PostId,
    last_category_id: CategoryId,
    posts: BTreeMap<PostId, PostRow>,
    categories: BTreeMap<CategoryId, Category>,
    links: BTreeSet<(PostId, CategoryId)>,
}

impl StoreState {
    fn assemble(&self, id: PostId, row: &PostRow) -> Post {
        let categories = self
            .links
            .range((id, CategoryId::MIN)..=(id, CategoryId::MAX))
            .filter_map(|(_, category_id)| self.categories.get(category_id))
            .map(Category::summary)
            .collect::<Vec<CategorySummary>>();

        Post {
            id,
            title: row.title.clone(),
            content: row.content.clone(),
            thumbnail_image_key: row.thumbnail_image_key.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            categories,
        }
    }

    fn category_ids_of(&self, id: PostId) -> Vec<CategoryId> {
        self.links
            .range((id, CategoryId::MIN)..=(id, CategoryId::MAX))
            .map(|(_, category_id)| *category_id)
            .collect()
    }

    fn ensure_categories_exist(&self, ids: &[CategoryId]) -> Result<(), RepoError> {
        match ids.iter().find(|id| !self.categories.contains_key(id)) {
            Some(missing) => Err(RepoError::Constraint(format!(
                "category {missing} does not exist"
            ))),
            None => Ok(()),
        }
    }
}

/// Post and category repositories backed by process memory.
///
/// Note: Data is lost on process restart.
#[derive(Default)]
pub struct InMemoryBlogStore {
    state: RwLock<StoreState>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored `(post_id, category_id)` association, sorted.
    pub async fn associations(&self) -> Vec<(PostId, CategoryId)> {
        self.state.read().await.links.iter().copied().collect()
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let state = self.state.read().await;

        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .map(|(id, row)| state.assemble(*id, row))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts)
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).map(|row| state.assemble(id, row)))
    }

    async fn create(&self, draft: PostDraft) -> Result<PostId, RepoError> {
        draft.validate_category_ids()?;

        let mut state = self.state.write().await;
        state.ensure_categories_exist(&draft.category_ids)?;

        state.last_post_id += 1;
        let id = state.last_post_id;
        let now = Utc::now();

        state.posts.insert(
            id,
            PostRow {
                title: draft.title,
                content: draft.content,
                thumbnail_image_key: draft.thumbnail_image_key,
                created_at: now,
                updated_at: now,
            },
        );
        for category_id in draft.category_ids {
            state.links.insert((id, category_id));
        }

        Ok(id)
    }

    async fn update(&self, id: PostId, draft: PostDraft) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;

        if !state.posts.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        let plan = CategorySync::plan(&state.category_ids_of(id), &draft.category_ids)?;
        state.ensure_categories_exist(&plan.to_insert)?;

        for category_id in &plan.to_remove {
            state.links.remove(&(id, *category_id));
        }
        for category_id in &plan.to_insert {
            state.links.insert((id, *category_id));
        }

        let row = state.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        row.title = draft.title;
        row.content = draft.content;
        row.thumbnail_image_key = draft.thumbnail_image_key;
        row.updated_at = Utc::now();

        let row = &state.posts[&id];
        Ok(state.assemble(id, row))
    }

    async fn delete(&self, id: PostId) -> Result<(), RepoError> {
        let mut state = self.state.write().await;

        if state.posts.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        state.links.retain(|(post_id, _)| *post_id != id);

        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryBlogStore {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let state = self.state.read().await;

        let mut categories: Vec<Category> = state.categories.values().cloned().collect();
        categories.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(categories)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepoError> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn create(&self, draft: CategoryDraft) -> Result<Category, RepoError> {
        let mut state = self.state.write().await;

        state.last_category_id += 1;
        let now = Utc::now();
        let category = Category {
            id: state.last_category_id,
            name: draft.name,
            created_at: now,
            updated_at: now,
        };
        state.categories.insert(category.id, category.clone());

        Ok(category)
    }

    async fn update(&self, id: CategoryId, draft: CategoryDraft) -> Result<Category, RepoError> {
        let mut state = self.state.write().await;

        let category = state.categories.get_mut(&id).ok_or(RepoError::NotFound)?;
        category.name = draft.name;
        category.updated_at = Utc::now();

        Ok(category.clone())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), RepoError> {
        let mut state = self.state.write().await;

        if state.categories.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        state.links.retain(|(_, category_id)| *category_id != id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_categories(store: &InMemoryBlogStore, names: &[&str]) -> Vec<CategoryId> {
        let mut ids = Vec::new();
        for name in names {
            let category = CategoryRepository::create(store, CategoryDraft::new(*name))
                .await
                .unwrap();
            ids.push(category.id);
        }
        ids
    }

    #[tokio::test]
    async fn test_update_reconciles_category_set() {
        let store = InMemoryBlogStore::new();
        let ids = seed_categories(&store, &["A", "B", "C"]).await;
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let post_id = PostRepository::create(
            &store,
            PostDraft::new("t", "c", "k").with_categories([a, b]),
        )
        .await
        .unwrap();

        let post = PostRepository::update(
            &store,
            post_id,
            PostDraft::new("t", "c", "k").with_categories([b, c]),
        )
        .await
        .unwrap();

        assert_eq!(post.category_ids(), vec![b, c]);
        assert_eq!(store.associations().await, vec![(post_id, b), (post_id, c)]);
    }

    #[tokio::test]
    async fn test_unknown_category_rolls_back_create() {
        let store = InMemoryBlogStore::new();

        let result =
            PostRepository::create(&store, PostDraft::new("t", "c", "k").with_categories([42]))
                .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
        assert!(PostRepository::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_category_detaches_posts() {
        let store = InMemoryBlogStore::new();
        let ids = seed_categories(&store, &["Tech", "Life"]).await;

        let post_id = PostRepository::create(
            &store,
            PostDraft::new("t", "c", "k").with_categories(ids.clone()),
        )
        .await
        .unwrap();
        CategoryRepository::delete(&store, ids[0]).await.unwrap();

        let post = PostRepository::find_by_id(&store, post_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(post.category_ids(), vec![ids[1]]);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let store = InMemoryBlogStore::new();

        let result = PostRepository::delete(&store, 99).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}

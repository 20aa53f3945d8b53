//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quill_core::domain::{Category, CategoryDraft, CategorySummary, Post, PostDraft};

/// A category reference inside a post request: `{"id": 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIdRef {
    pub id: i32,
}

/// Body of `POST /api/admin/posts` and `PUT /api/admin/posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub title: String,
    pub content: String,
    #[serde(alias = "thumbnailUrl")]
    pub thumbnail_image_key: String,
    pub categories: Vec<CategoryIdRef>,
}

impl From<PostRequest> for PostDraft {
    fn from(req: PostRequest) -> Self {
        PostDraft::new(req.title, req.content, req.thumbnail_image_key)
            .with_categories(req.categories.into_iter().map(|c| c.id))
    }
}

/// Body of `POST /api/admin/categories` and `PUT /api/admin/categories/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

impl From<CategoryRequest> for CategoryDraft {
    fn from(req: CategoryRequest) -> Self {
        CategoryDraft::new(req.name)
    }
}

/// Category as joined onto a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
}

impl From<CategorySummary> for CategoryRef {
    fn from(summary: CategorySummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
        }
    }
}

/// A post with its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub thumbnail_image_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<CategoryRef>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            thumbnail_image_key: post.thumbnail_image_key,
            created_at: post.created_at,
            updated_at: post.updated_at,
            categories: post.categories.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// `{"posts": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostList {
    pub posts: Vec<PostResponse>,
}

/// `{"post": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostItem {
    pub post: PostResponse,
}

/// `{"categories": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<CategoryResponse>,
}

/// `{"category": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryItem {
    pub category: CategoryResponse,
}

/// `{"id": 10}` - returned by create endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResource {
    pub id: i32,
}

/// Result of a thumbnail upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailUpload {
    pub key: String,
    pub url: String,
}

/// No payload beyond the status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

//! Category endpoints.

use actix_web::{HttpResponse, web};

use quill_core::domain::{CategoryDraft, CategoryId};
use quill_shared::ApiResponse;
use quill_shared::dto::{CategoryItem, CategoryList, CategoryRequest, CreatedResource, Empty};

use crate::middleware::{AppError, AppResult, Identity};
use crate::state::AppState;

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.categories.list().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryList {
        categories: categories.into_iter().map(Into::into).collect(),
    })))
}

/// GET /api/categories/{id}
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<CategoryId>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found")))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryItem {
        category: category.into(),
    })))
}

/// GET /api/admin/categories
pub async fn admin_list(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    list(state).await
}

/// GET /api/admin/categories/{id}
pub async fn admin_get(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<CategoryId>,
) -> AppResult<HttpResponse> {
    get(state, path).await
}

/// POST /api/admin/categories
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state
        .categories
        .create(CategoryDraft::from(body.into_inner()))
        .await?;
    tracing::info!(category_id = category.id, admin = %identity.subject, "Category created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        CreatedResource { id: category.id },
        "Category created",
    )))
}

/// PUT /api/admin/categories/{id}
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<CategoryId>,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let category = state
        .categories
        .update(id, CategoryDraft::from(body.into_inner()))
        .await?;
    tracing::info!(category_id = id, admin = %identity.subject, "Category updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(CategoryItem {
        category: category.into(),
    })))
}

/// DELETE /api/admin/categories/{id}
///
/// Links to posts go with the category; the posts themselves stay.
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<CategoryId>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    state.categories.delete(id).await?;
    tracing::info!(category_id = id, admin = %identity.subject, "Category deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(Empty {})))
}

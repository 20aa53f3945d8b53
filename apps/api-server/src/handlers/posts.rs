//! Post endpoints: public reads and the bearer-protected admin resource.

use actix_web::{HttpResponse, web};

use quill_core::domain::{PostDraft, PostId};
use quill_shared::ApiResponse;
use quill_shared::dto::{CreatedResource, Empty, PostItem, PostList, PostRequest};

use crate::middleware::{AppError, AppResult, Identity};
use crate::state::AppState;

/// GET /api/posts
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostList {
        posts: posts.into_iter().map(Into::into).collect(),
    })))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<PostId>) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {id} not found")))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostItem { post: post.into() })))
}

/// GET /api/admin/posts
pub async fn admin_list(_identity: Identity, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    list(state).await
}

/// GET /api/admin/posts/{id}
pub async fn admin_get(
    _identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    get(state, path).await
}

/// POST /api/admin/posts
pub async fn create(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let draft = PostDraft::from(body.into_inner());

    let id = state.posts.create(draft).await?;
    tracing::info!(post_id = id, admin = %identity.subject, "Post created");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        CreatedResource { id },
        "Post created",
    )))
}

/// PUT /api/admin/posts/{id}
///
/// Replaces the post's fields and brings its category links in line with the
/// submitted list. Responds with the post as stored afterwards.
pub async fn update(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let draft = PostDraft::from(body.into_inner());

    let post = state.posts.update(id, draft).await?;
    tracing::info!(post_id = id, admin = %identity.subject, "Post updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostItem { post: post.into() })))
}

/// DELETE /api/admin/posts/{id}
pub async fn delete(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    state.posts.delete(id).await?;
    tracing::info!(post_id = id, admin = %identity.subject, "Post deleted");

    Ok(HttpResponse::Ok().json(ApiResponse::ok(Empty {})))
}

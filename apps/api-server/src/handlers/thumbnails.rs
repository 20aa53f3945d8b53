//! Thumbnail upload endpoint.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use bytes::BytesMut;
use futures::StreamExt;

use quill_shared::ApiResponse;
use quill_shared::dto::ThumbnailUpload;

use crate::middleware::error::payload_error_handler;
use crate::middleware::{AppError, AppResult, Identity};
use crate::observability::RequestId;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// POST /api/admin/thumbnails
///
/// The request body is the raw image; its `Content-Type` is stored alongside it.
/// Responds with the storage key to put into a post's `thumbnailImageKey` and the
/// URL the image is served from.
pub async fn upload(
    identity: Identity,
    request_id: RequestId,
    state: web::Data<AppState>,
    req: HttpRequest,
    mut payload: web::Payload,
) -> AppResult<HttpResponse> {
    let limit = state.max_upload_bytes;

    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(AppError::PayloadTooLarge(format!(
            "Thumbnail exceeds {limit} bytes"
        )));
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(payload_error_handler)?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "Thumbnail exceeds {limit} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    let size = body.len();
    let uploaded = state.uploader.upload(body.freeze(), content_type).await?;
    tracing::info!(
        request_id = request_id.as_str(),
        key = %uploaded.key,
        size,
        content_type,
        admin = %identity.subject,
        "Thumbnail uploaded"
    );

    Ok(HttpResponse::Created().json(ApiResponse::ok(ThumbnailUpload {
        key: uploaded.key,
        url: uploaded.url,
    })))
}

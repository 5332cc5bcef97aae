//! The two pipeline routes: upload an original, confirm a crop.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use vitrina_core::AppError;
use vitrina_processing::{CropRect, UploadPayload};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub status: String,
    pub path: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CropImageResponse {
    pub thumbnail: String,
    pub cropped: String,
}

/// Pull the single file field out of the multipart body.
async fn file_payload(mut multipart: Multipart) -> Result<UploadPayload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid("file", format!("unreadable multipart body: {}", e)))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::invalid("file", format!("unreadable file field: {}", e)))?;
            return Ok(UploadPayload::new(file_name, data));
        }
    }
    Err(AppError::invalid("file", "No file was uploaded."))
}

#[utoipa::path(
    post,
    path = "/api/{kind}/{id}/image",
    tag = "media",
    params(
        ("kind" = String, Path, description = "Entity type / upload profile slug"),
        ("id" = Uuid, Path, description = "Owning record id")
    ),
    responses(
        (status = 200, description = "Original stored", body = UploadImageResponse),
        (status = 400, description = "No or oversized file", body = ErrorResponse),
        (status = 404, description = "Unknown profile or record", body = ErrorResponse)
    )
)]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, Uuid)>,
    multipart: Multipart,
) -> Result<Json<UploadImageResponse>, HttpAppError> {
    let payload = file_payload(multipart).await?;
    let path = state.orchestrator.handle_upload(&kind, id, &payload).await?;
    Ok(Json(UploadImageResponse {
        status: "picture uploaded".to_string(),
        path,
    }))
}

#[utoipa::path(
    post,
    path = "/api/{kind}/{id}/image/crop",
    tag = "media",
    params(
        ("kind" = String, Path, description = "Entity type / upload profile slug"),
        ("id" = Uuid, Path, description = "Owning record id")
    ),
    request_body = CropRect,
    responses(
        (status = 200, description = "Both renditions committed", body = CropImageResponse),
        (status = 404, description = "Unknown profile, record or original", body = ErrorResponse),
        (status = 500, description = "Rendition failed; thumbnail may already be committed", body = ErrorResponse)
    )
)]
pub async fn crop_image(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(rect): Json<CropRect>,
) -> Result<Json<CropImageResponse>, HttpAppError> {
    let derived = state.orchestrator.handle_crop(&kind, id, rect).await?;
    Ok(Json(CropImageResponse {
        thumbnail: derived.thumbnail,
        cropped: derived.cropped,
    }))
}

//! Upload-profile administration. Creation provisions the profile's
//! directory tree before anything is persisted: a profile whose directories
//! could not be created never reaches the catalog.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vitrina_core::{
    AppError, Page, PageQuery, UploadProfile, UploadProfileDraft, UploadProfilePatch,
};

use crate::auth::Principal;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/upload-profiles",
    tag = "upload-profiles",
    request_body = UploadProfileDraft,
    responses(
        (status = 200, description = "Profile created", body = UploadProfile),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 409, description = "Profile slug already exists", body = ErrorResponse)
    )
)]
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(draft): Json<UploadProfileDraft>,
) -> Result<Json<UploadProfile>, HttpAppError> {
    let valid = draft.validate()?;

    let paths = state
        .planner
        .provision(&valid.slug)
        .await
        .map_err(AppError::from)?;

    let profile = state
        .profiles
        .create(&valid, &paths, Some(principal.id))
        .await?;

    tracing::info!(slug = %profile.slug, by = %principal.email, "Created upload profile");
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/upload-profiles",
    tag = "upload-profiles",
    responses((status = 200, description = "Paged profile listing"))
)]
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<UploadProfile>>, HttpAppError> {
    Ok(Json(state.profiles.list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/upload-profiles/{slug}",
    tag = "upload-profiles",
    responses(
        (status = 200, description = "The profile", body = UploadProfile),
        (status = 404, description = "Unknown slug", body = ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<UploadProfile>, HttpAppError> {
    let profile = state
        .profiles
        .by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("upload profile '{}'", slug)))?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/upload-profiles/{id}",
    tag = "upload-profiles",
    request_body = UploadProfilePatch,
    responses(
        (status = 200, description = "Updated profile", body = UploadProfile),
        (status = 409, description = "Update matched zero records", body = ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<UploadProfilePatch>,
) -> Result<Json<UploadProfile>, HttpAppError> {
    Ok(Json(state.profiles.update(id, &patch).await?))
}

#[utoipa::path(
    delete,
    path = "/api/upload-profiles/{id}",
    tag = "upload-profiles",
    responses(
        (status = 200, description = "Deleted profile", body = UploadProfile),
        (status = 404, description = "Unknown id", body = ErrorResponse)
    )
)]
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UploadProfile>, HttpAppError> {
    // Catalog entry only; provisioned directories and files referenced by
    // owning records stay on disk.
    let profile = state.profiles.delete(id).await?;
    tracing::info!(slug = %profile.slug, "Deleted upload profile");
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::state_with_root;
    use vitrina_core::models::user::Role;

    fn admin() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            role: Role::SuperUser,
            email: "super@admin.com".to_string(),
            full_name: "Admin Super".to_string(),
        }
    }

    #[tokio::test]
    async fn create_provisions_real_directories_then_persists() {
        let root = tempfile::tempdir().unwrap();
        let state = state_with_root(root.path()).await;

        let draft = UploadProfileDraft {
            name: Some("Promotions".to_string()),
            aspect_ratio: Some("4:3".to_string()),
            crop: Some(true),
            ..Default::default()
        };
        let created = create_profile(State(state.clone()), admin(), Json(draft))
            .await
            .unwrap();

        let found = get_profile(State(state.clone()), Path("promotions".to_string()))
            .await
            .unwrap();
        assert_eq!(found.0.id, created.0.id);

        for rel in [
            &found.0.original_path,
            &found.0.cropped_path,
            &found.0.thumbnails_path,
        ] {
            assert!(root.path().join(rel.trim_start_matches('/')).is_dir());
        }
    }
}

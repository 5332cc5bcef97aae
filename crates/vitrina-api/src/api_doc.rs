use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use crate::handlers::login::{LoginRequest, LoginResponse};
use crate::handlers::media::{CropImageResponse, UploadImageResponse};
use vitrina_core::models::user::{Role, User};
use vitrina_core::{
    AspectRatio, FieldError, ImageSet, UploadProfile, UploadProfileDraft, UploadProfilePatch,
};
use vitrina_processing::CropRect;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login::login,
        handlers::upload_profiles::create_profile,
        handlers::upload_profiles::list_profiles,
        handlers::upload_profiles::get_profile,
        handlers::upload_profiles::update_profile,
        handlers::upload_profiles::delete_profile,
        handlers::media::upload_image,
        handlers::media::crop_image,
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        User,
        Role,
        ImageSet,
        AspectRatio,
        UploadProfile,
        UploadProfileDraft,
        UploadProfilePatch,
        CropRect,
        UploadImageResponse,
        CropImageResponse,
        ErrorResponse,
        FieldError,
    )),
    tags(
        (name = "auth", description = "Token-based login"),
        (name = "upload-profiles", description = "Image upload profile administration"),
        (name = "media", description = "Image ingestion and crop pipeline")
    )
)]
pub struct ApiDoc;

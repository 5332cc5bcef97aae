//! Vitrina Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration and
//! shared helpers used by every Vitrina component: the upload-profile catalog,
//! the image pipeline crates and the HTTP surface.

pub mod config;
pub mod error;
pub mod models;
pub mod pagination;
pub mod slug;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, FieldError, LogLevel};
pub use models::image::{ImageSet, ImageStage, Rendition};
pub use models::owner::{OwnerAccessor, OwnerRecord, ProfileDirectory};
pub use models::upload_profile::{
    AspectRatio, UploadProfile, UploadProfileDraft, UploadProfilePatch, ValidatedProfile,
};
pub use pagination::{Page, PageQuery};
pub use slug::slugify;

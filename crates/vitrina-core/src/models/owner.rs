//! The pipeline's view of an owning record (user, seller, promotion, ...).
//!
//! The pipeline never touches catalog fields. It reads the identity facts it
//! needs to name files deterministically and writes back the `ImageSet`
//! sub-structure, once per stage, through an accessor injected per entity
//! type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::image::ImageSet;
use crate::models::upload_profile::UploadProfile;

/// The slice of an owning record the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerRecord {
    pub id: Uuid,
    /// The record's natural slug or name; the upload basename seed.
    pub natural_slug: String,
    pub created_at: DateTime<Utc>,
    pub image: ImageSet,
}

impl OwnerRecord {
    /// Deterministic basename for this record's files: stable across
    /// re-uploads so a new upload overwrites instead of accumulating.
    pub fn file_basename(&self) -> String {
        crate::slug::slugify(&format!(
            "{} {}",
            self.natural_slug,
            self.created_at.timestamp_millis()
        ))
    }
}

/// Load/save capability for one entity type's records. Implemented by each
/// catalog repository and registered with the orchestrator under the entity's
/// profile slug.
#[async_trait]
pub trait OwnerAccessor: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<OwnerRecord>, AppError>;

    /// Persist only the image sub-structure of the record. Called exactly
    /// once per pipeline stage, after that stage's file write succeeded.
    async fn save_image(&self, id: Uuid, image: &ImageSet) -> Result<(), AppError>;
}

/// Profile lookup capability consumed by the orchestrator.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<UploadProfile>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn basename_is_slug_plus_millis() {
        let record = OwnerRecord {
            id: Uuid::new_v4(),
            natural_slug: "fresh-mart".to_string(),
            created_at: Utc.timestamp_millis_opt(1_588_941_000_123).unwrap(),
            image: ImageSet::default(),
        };
        assert_eq!(record.file_basename(), "fresh-mart-1588941000123");
        // Stable across calls: re-uploading overwrites, never accumulates.
        assert_eq!(record.file_basename(), record.file_basename());
    }
}

//! Derive stage: produce the thumbnail and cropped renditions from a stored
//! original and one crop rectangle.

use uuid::Uuid;
use vitrina_core::{AppError, OwnerAccessor, Rendition, UploadProfile};
use vitrina_storage::PublicStore;

use crate::rect::CropRect;
use crate::renditions::{render, RenditionSpec};

/// Root-relative paths of the two committed renditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPaths {
    pub thumbnail: String,
    pub cropped: String,
}

pub struct DerivedAssetGenerator {
    store: PublicStore,
}

impl DerivedAssetGenerator {
    pub fn new(store: PublicStore) -> Self {
        DerivedAssetGenerator { store }
    }

    /// Produce both renditions from the record's stored original.
    ///
    /// The two outputs are committed one at a time: thumbnail file, persist,
    /// cropped file, persist. A fault in the second half leaves the already
    /// committed thumbnail in place; callers must treat an error as
    /// "possibly partially applied". Rendition files are named like the
    /// original, so re-cropping overwrites the previous files at the same
    /// paths.
    pub async fn derive(
        &self,
        accessor: &dyn OwnerAccessor,
        owner_id: Uuid,
        profile: &UploadProfile,
        rect: CropRect,
    ) -> Result<DerivedPaths, AppError> {
        let mut owner = accessor
            .load(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("record {}", owner_id)))?;

        if owner.image.original.is_empty() {
            return Err(AppError::NotFound(format!(
                "record {} has no ingested original",
                owner_id
            )));
        }

        let original = self.store.read(&owner.image.original).await?;
        let file_name = format!("{}.jpg", owner.file_basename());

        // Thumbnail first. The write happens before the record is touched,
        // and the record is persisted before the cropped rendition starts.
        let spec = RenditionSpec::thumbnail(profile);
        let bytes = render(&original, &rect, spec)
            .map_err(|e| AppError::processing(Rendition::Thumbnail, e.to_string()))?;
        let thumbnail = self
            .store
            .write(&profile.thumbnails_path, &file_name, &bytes)
            .await?;
        owner.image.thumbnail = thumbnail.clone();
        accessor.save_image(owner_id, &owner.image).await?;

        // Cropped rendition, decoded again from the original bytes, never
        // from the thumbnail output.
        let spec = RenditionSpec::cropped(profile);
        let bytes = render(&original, &rect, spec)
            .map_err(|e| AppError::processing(Rendition::Cropped, e.to_string()))?;
        let cropped = self
            .store
            .write(&profile.cropped_path, &file_name, &bytes)
            .await?;
        owner.image.cropped = cropped.clone();
        accessor.save_image(owner_id, &owner.image).await?;

        tracing::info!(
            owner_id = %owner_id,
            profile = %profile.slug,
            thumbnail = %thumbnail,
            cropped = %cropped,
            "Derived renditions"
        );

        Ok(DerivedPaths { thumbnail, cropped })
    }
}

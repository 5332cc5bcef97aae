//! Ingest stage: validate one raw upload, store it under the profile's
//! original directory, record the path on the owning record.

use bytes::Bytes;
use std::path::Path;
use uuid::Uuid;
use vitrina_core::{AppError, OwnerAccessor, UploadProfile};
use vitrina_storage::PublicStore;

/// One uploaded file as received from the transport layer.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadPayload {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        UploadPayload {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// The upload's extension, dot included, preserved unchanged. A file
    /// without one gets none.
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }
}

pub struct AssetIngestor {
    store: PublicStore,
}

impl AssetIngestor {
    pub fn new(store: PublicStore) -> Self {
        AssetIngestor { store }
    }

    /// Store the payload as `<profile.original_path>/<basename><ext>` and,
    /// only after the write succeeded, record the path on the owning record.
    /// The basename is deterministic per record, so a re-upload overwrites
    /// the previous original instead of accumulating files.
    pub async fn ingest(
        &self,
        accessor: &dyn OwnerAccessor,
        owner_id: Uuid,
        profile: &UploadProfile,
        payload: &UploadPayload,
    ) -> Result<String, AppError> {
        if payload.data.is_empty() {
            return Err(AppError::invalid("file", "No file was uploaded."));
        }
        if payload.data.len() as i64 > profile.max_size {
            return Err(AppError::invalid(
                "file",
                format!(
                    "File is {} bytes; profile '{}' allows at most {} bytes.",
                    payload.data.len(),
                    profile.slug,
                    profile.max_size
                ),
            ));
        }

        let mut owner = accessor
            .load(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("record {}", owner_id)))?;

        let file_name = format!("{}{}", owner.file_basename(), payload.extension());
        let relative = self
            .store
            .write(&profile.original_path, &file_name, &payload.data)
            .await?;

        owner.image.original = relative.clone();
        accessor.save_image(owner_id, &owner.image).await?;

        tracing::info!(
            owner_id = %owner_id,
            profile = %profile.slug,
            path = %relative,
            "Ingested original upload"
        );

        Ok(relative)
    }
}

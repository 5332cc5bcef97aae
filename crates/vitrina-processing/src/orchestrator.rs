//! Route-facing pipeline entry point.
//!
//! The orchestrator owns exactly two operations: `handle_upload` and
//! `handle_crop`. It resolves the upload profile by slug through an injected
//! `ProfileDirectory` and the owning-record accessor through a per-entity
//! registry, then sequences the corresponding stage. A failed stage ends the
//! request; there is no catch-and-continue and no retry.
//!
//! Concurrency: nothing serializes writes per owning record. Two concurrent
//! crop requests for the same record race and the later commit wins, on both
//! the files and the image fields. That matches the accepted behavior of the
//! system; the only concurrency guard in this core is the store's unique
//! index on profile slug.

use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use vitrina_core::{AppError, OwnerAccessor, ProfileDirectory, UploadProfile};
use vitrina_storage::PublicStore;

use crate::derive::{DerivedAssetGenerator, DerivedPaths};
use crate::ingest::{AssetIngestor, UploadPayload};
use crate::rect::CropRect;

pub struct Orchestrator {
    profiles: Arc<dyn ProfileDirectory>,
    accessors: HashMap<String, Arc<dyn OwnerAccessor>>,
    ingestor: AssetIngestor,
    generator: DerivedAssetGenerator,
}

impl Orchestrator {
    pub fn new(profiles: Arc<dyn ProfileDirectory>, store: PublicStore) -> Self {
        Orchestrator {
            profiles,
            accessors: HashMap::new(),
            ingestor: AssetIngestor::new(store.clone()),
            generator: DerivedAssetGenerator::new(store),
        }
    }

    /// Register the record accessor for one entity type, keyed by the slug
    /// of the profile that governs it (`users`, `sellers`, `promotions`).
    pub fn register_accessor(
        mut self,
        profile_slug: impl Into<String>,
        accessor: Arc<dyn OwnerAccessor>,
    ) -> Self {
        self.accessors.insert(profile_slug.into(), accessor);
        self
    }

    /// Ingest one uploaded file for the record under the named profile.
    pub async fn handle_upload(
        &self,
        profile_slug: &str,
        owner_id: Uuid,
        payload: &UploadPayload,
    ) -> Result<String, AppError> {
        let profile = self.profile(profile_slug).await?;
        let accessor = self.accessor(profile_slug)?;
        self.ingestor
            .ingest(accessor.as_ref(), owner_id, &profile, payload)
            .await
    }

    /// Produce both renditions for the record from a crop rectangle.
    pub async fn handle_crop(
        &self,
        profile_slug: &str,
        owner_id: Uuid,
        rect: CropRect,
    ) -> Result<DerivedPaths, AppError> {
        let profile = self.profile(profile_slug).await?;
        if !profile.crop {
            return Err(AppError::invalid(
                "crop",
                format!("profile '{}' does not use a crop step", profile_slug),
            ));
        }
        let accessor = self.accessor(profile_slug)?;
        self.generator
            .derive(accessor.as_ref(), owner_id, &profile, rect)
            .await
    }

    async fn profile(&self, slug: &str) -> Result<UploadProfile, AppError> {
        self.profiles
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("upload profile '{}'", slug)))
    }

    fn accessor(&self, slug: &str) -> Result<&Arc<dyn OwnerAccessor>, AppError> {
        self.accessors
            .get(slug)
            .ok_or_else(|| AppError::NotFound(format!("no record accessor for '{}'", slug)))
    }
}

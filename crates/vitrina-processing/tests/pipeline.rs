//! End-to-end pipeline tests: ingest an upload, derive both renditions,
//! observe the committed paths and the intermediate state.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use vitrina_core::{
    AppError, AspectRatio, ImageSet, ImageStage, OwnerAccessor, OwnerRecord, ProfileDirectory,
    UploadProfile,
};
use vitrina_processing::{CropRect, Orchestrator, UploadPayload};
use vitrina_storage::{PathPlanner, PublicStore};

struct MemoryOwners {
    records: Mutex<HashMap<Uuid, OwnerRecord>>,
    /// When set, `save_image` fails as soon as a cropped path is committed,
    /// simulating a fault between the two rendition commits.
    fail_on_cropped_save: bool,
}

impl MemoryOwners {
    fn new() -> Self {
        MemoryOwners {
            records: Mutex::new(HashMap::new()),
            fail_on_cropped_save: false,
        }
    }

    fn failing_after_thumbnail() -> Self {
        MemoryOwners {
            records: Mutex::new(HashMap::new()),
            fail_on_cropped_save: true,
        }
    }

    fn insert(&self, record: OwnerRecord) {
        self.records.lock().unwrap().insert(record.id, record);
    }

    fn image_of(&self, id: Uuid) -> ImageSet {
        self.records.lock().unwrap().get(&id).unwrap().image.clone()
    }
}

#[async_trait]
impl OwnerAccessor for MemoryOwners {
    async fn load(&self, id: Uuid) -> Result<Option<OwnerRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn save_image(&self, id: Uuid, image: &ImageSet) -> Result<(), AppError> {
        if self.fail_on_cropped_save && !image.cropped.is_empty() {
            return Err(AppError::Internal("record store went away".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("record {}", id)))?;
        record.image = image.clone();
        Ok(())
    }
}

struct MemoryProfiles {
    profiles: Vec<UploadProfile>,
}

#[async_trait]
impl ProfileDirectory for MemoryProfiles {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<UploadProfile>, AppError> {
        Ok(self.profiles.iter().find(|p| p.slug == slug).cloned())
    }
}

fn promotions_profile(paths: &vitrina_storage::ProfilePaths) -> UploadProfile {
    let now = Utc::now();
    UploadProfile {
        id: Uuid::new_v4(),
        name: "Promotions".to_string(),
        slug: "promotions".to_string(),
        crop: true,
        max_size: 2 * 1024 * 1024,
        aspect_ratio: AspectRatio::parse("4:3").unwrap(),
        thumbnail_width: 300,
        cropped_width: 900,
        original_path: paths.original.clone(),
        cropped_path: paths.cropped.clone(),
        thumbnails_path: paths.thumbnails.clone(),
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

fn promo_record() -> OwnerRecord {
    OwnerRecord {
        id: Uuid::new_v4(),
        natural_slug: "half-price-friday".to_string(),
        created_at: Utc.timestamp_millis_opt(1_588_941_000_123).unwrap(),
        image: ImageSet::default(),
    }
}

fn png_upload(width: u32, height: u32) -> UploadPayload {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 120, 255])
    }));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    UploadPayload::new("banner.png", buffer.into_inner())
}

async fn setup(
    owners: Arc<MemoryOwners>,
) -> (tempfile::TempDir, Orchestrator, PublicStore) {
    let root = tempfile::tempdir().unwrap();
    let planner = PathPlanner::new(root.path());
    let paths = planner.provision("promotions").await.unwrap();
    let store = PublicStore::new(root.path());

    let profiles = Arc::new(MemoryProfiles {
        profiles: vec![promotions_profile(&paths)],
    });
    let orchestrator =
        Orchestrator::new(profiles, store.clone()).register_accessor("promotions", owners);
    (root, orchestrator, store)
}

#[tokio::test]
async fn upload_then_crop_produces_both_renditions() {
    let owners = Arc::new(MemoryOwners::new());
    let record = promo_record();
    let owner_id = record.id;
    owners.insert(record);
    let (_root, orchestrator, store) = setup(owners.clone()).await;

    let original = orchestrator
        .handle_upload("promotions", owner_id, &png_upload(1024, 768))
        .await
        .unwrap();
    assert_eq!(
        original,
        "/uploads/promotions/original/half-price-friday-1588941000123.png"
    );
    assert!(store.exists(&original).await.unwrap());
    assert_eq!(owners.image_of(owner_id).stage(), ImageStage::Ingested);

    let derived = orchestrator
        .handle_crop(
            "promotions",
            owner_id,
            CropRect::new(0, 0, 800, 600),
        )
        .await
        .unwrap();
    assert_eq!(
        derived.thumbnail,
        "/uploads/promotions/thumbnails/half-price-friday-1588941000123.jpg"
    );
    assert_eq!(
        derived.cropped,
        "/uploads/promotions/cropped/half-price-friday-1588941000123.jpg"
    );

    // The spec'd scenario: 4:3 profile, widths 300/900 -> 300x225 and 900x675.
    let thumb = image::load_from_memory(&store.read(&derived.thumbnail).await.unwrap()).unwrap();
    assert_eq!(thumb.dimensions(), (300, 225));
    let cropped = image::load_from_memory(&store.read(&derived.cropped).await.unwrap()).unwrap();
    assert_eq!(cropped.dimensions(), (900, 675));

    let image = owners.image_of(owner_id);
    assert_eq!(image.stage(), ImageStage::Cropped);
    assert_eq!(image.thumbnail, derived.thumbnail);
    assert_eq!(image.cropped, derived.cropped);
}

#[tokio::test]
async fn reupload_overwrites_the_same_original_path() {
    let owners = Arc::new(MemoryOwners::new());
    let record = promo_record();
    let owner_id = record.id;
    owners.insert(record);
    let (_root, orchestrator, store) = setup(owners.clone()).await;

    let first = orchestrator
        .handle_upload("promotions", owner_id, &png_upload(640, 480))
        .await
        .unwrap();
    let first_bytes = store.read(&first).await.unwrap();

    let second = orchestrator
        .handle_upload("promotions", owner_id, &png_upload(1024, 768))
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_ne!(store.read(&second).await.unwrap(), first_bytes);
}

#[tokio::test]
async fn negative_crop_origin_behaves_like_zero() {
    let owners = Arc::new(MemoryOwners::new());
    let record = promo_record();
    let owner_id = record.id;
    owners.insert(record);
    let (_root, orchestrator, store) = setup(owners.clone()).await;

    orchestrator
        .handle_upload("promotions", owner_id, &png_upload(1024, 768))
        .await
        .unwrap();

    let negative = orchestrator
        .handle_crop("promotions", owner_id, CropRect::new(-5, -3, 400, 300))
        .await
        .unwrap();
    let negative_bytes = store.read(&negative.thumbnail).await.unwrap();

    let zeroed = orchestrator
        .handle_crop("promotions", owner_id, CropRect::new(0, 0, 400, 300))
        .await
        .unwrap();
    let zeroed_bytes = store.read(&zeroed.thumbnail).await.unwrap();

    assert_eq!(negative_bytes, zeroed_bytes);
}

#[tokio::test]
async fn recrop_overwrites_rendition_files_in_place() {
    let owners = Arc::new(MemoryOwners::new());
    let record = promo_record();
    let owner_id = record.id;
    owners.insert(record);
    let (_root, orchestrator, store) = setup(owners.clone()).await;

    orchestrator
        .handle_upload("promotions", owner_id, &png_upload(1024, 768))
        .await
        .unwrap();

    let first = orchestrator
        .handle_crop("promotions", owner_id, CropRect::new(0, 0, 800, 600))
        .await
        .unwrap();
    let first_bytes = store.read(&first.cropped).await.unwrap();

    let second = orchestrator
        .handle_crop("promotions", owner_id, CropRect::new(200, 150, 400, 300))
        .await
        .unwrap();

    // Same path, different content: idempotent path, mutable bytes.
    assert_eq!(first.cropped, second.cropped);
    assert_ne!(store.read(&second.cropped).await.unwrap(), first_bytes);
}

#[tokio::test]
async fn crop_before_ingest_is_not_found() {
    let owners = Arc::new(MemoryOwners::new());
    let record = promo_record();
    let owner_id = record.id;
    owners.insert(record);
    let (_root, orchestrator, _store) = setup(owners).await;

    let err = orchestrator
        .handle_crop("promotions", owner_id, CropRect::new(0, 0, 100, 100))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn empty_and_oversized_uploads_are_validation_errors() {
    let owners = Arc::new(MemoryOwners::new());
    let record = promo_record();
    let owner_id = record.id;
    owners.insert(record);
    let (_root, orchestrator, _store) = setup(owners).await;

    let err = orchestrator
        .handle_upload(
            "promotions",
            owner_id,
            &UploadPayload::new("empty.png", Vec::new()),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_FAILED");

    let err = orchestrator
        .handle_upload(
            "promotions",
            owner_id,
            &UploadPayload::new("huge.png", vec![0u8; 3 * 1024 * 1024]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_FAILED");
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let owners = Arc::new(MemoryOwners::new());
    let (_root, orchestrator, _store) = setup(owners).await;

    let err = orchestrator
        .handle_upload("articles", Uuid::new_v4(), &png_upload(10, 10))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn fault_after_thumbnail_commit_leaves_intermediate_state_observable() {
    let owners = Arc::new(MemoryOwners::failing_after_thumbnail());
    let record = promo_record();
    let owner_id = record.id;
    owners.insert(record);
    let (_root, orchestrator, store) = setup(owners.clone()).await;

    orchestrator
        .handle_upload("promotions", owner_id, &png_upload(1024, 768))
        .await
        .unwrap();

    let err = orchestrator
        .handle_crop("promotions", owner_id, CropRect::new(0, 0, 800, 600))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INTERNAL_ERROR");

    // The thumbnail commit survives the later fault: partial completion is
    // surfaced, not rolled back.
    let image = owners.image_of(owner_id);
    assert_eq!(image.stage(), ImageStage::Thumbnailed);
    assert!(store.exists(&image.thumbnail).await.unwrap());
    assert!(image.cropped.is_empty());
}

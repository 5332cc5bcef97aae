//! Repository for the upload-profile catalog.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use vitrina_core::{
    AppError, AspectRatio, Page, PageQuery, ProfileDirectory, UploadProfile, UploadProfilePatch,
    ValidatedProfile,
};
use vitrina_storage::ProfilePaths;

use crate::is_unique_violation;

const COLUMNS: &str = "id, name, slug, crop, max_size, aspect_ratio, thumbnail_width, \
     cropped_width, original_path, cropped_path, thumbnails_path, created_by, \
     created_at, updated_at";

#[derive(Clone)]
pub struct UploadProfileRepository {
    pool: SqlitePool,
}

impl UploadProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a validated draft whose directories were already provisioned.
    /// The unique index on `slug` turns a duplicate into a conflict instead
    /// of a silent overwrite.
    #[tracing::instrument(skip(self, valid, paths), fields(db.table = "upload_profiles", db.operation = "insert"))]
    pub async fn create(
        &self,
        valid: &ValidatedProfile,
        paths: &ProfilePaths,
        created_by: Option<Uuid>,
    ) -> Result<UploadProfile, AppError> {
        let profile = UploadProfile {
            id: Uuid::new_v4(),
            name: valid.name.clone(),
            slug: valid.slug.clone(),
            crop: valid.crop,
            max_size: valid.max_size,
            aspect_ratio: valid.aspect_ratio,
            thumbnail_width: valid.thumbnail_width,
            cropped_width: valid.cropped_width,
            original_path: paths.original.clone(),
            cropped_path: paths.cropped.clone(),
            thumbnails_path: paths.thumbnails.clone(),
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO upload_profiles (id, name, slug, crop, max_size, aspect_ratio, \
             thumbnail_width, cropped_width, original_path, cropped_path, thumbnails_path, \
             created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(&profile.slug)
        .bind(profile.crop)
        .bind(profile.max_size)
        .bind(profile.aspect_ratio.to_colon_string())
        .bind(profile.thumbnail_width as i64)
        .bind(profile.cropped_width as i64)
        .bind(&profile.original_path)
        .bind(&profile.cropped_path)
        .bind(&profile.thumbnails_path)
        .bind(profile.created_by)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(profile),
            Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(format!(
                "upload profile '{}' already exists",
                profile.name
            ))),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_profiles", db.operation = "select"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<UploadProfile>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM upload_profiles WHERE id = ?",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| profile_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "upload_profiles", db.operation = "select"))]
    pub async fn by_slug(&self, slug: &str) -> Result<Option<UploadProfile>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM upload_profiles WHERE slug = ?",
            COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| profile_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "upload_profiles", db.operation = "select"))]
    pub async fn list(&self, query: &PageQuery) -> Result<Page<UploadProfile>, AppError> {
        let pattern = format!("%{}%", query.query);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM upload_profiles WHERE name LIKE ?")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let sort = match query.sort.as_deref() {
            Some("name") => "name",
            Some("updatedAt") => "updated_at",
            _ => "created_at",
        };
        let direction = if query.descending() { "DESC" } else { "ASC" };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM upload_profiles WHERE name LIKE ? \
             ORDER BY {} {} LIMIT ? OFFSET ?",
            COLUMNS, sort, direction
        ))
        .bind(&pattern)
        .bind(query.limit() as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, query))
    }

    /// Patch the non-identity fields. A stale id surfaces as `NotModified`:
    /// the update matched zero records, which looks retryable to callers but
    /// is terminal.
    #[tracing::instrument(skip(self, patch), fields(db.table = "upload_profiles", db.operation = "update"))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: &UploadProfilePatch,
    ) -> Result<UploadProfile, AppError> {
        let Some(existing) = self.get(id).await? else {
            return Err(AppError::NotModified(format!("upload profile {}", id)));
        };

        let aspect_ratio = patch.parsed_aspect_ratio()?.unwrap_or(existing.aspect_ratio);
        let max_size = match patch.max_size {
            Some(size) if size <= 0 => {
                return Err(AppError::invalid("maxSize", "Max size must be positive."))
            }
            Some(size) => size,
            None => existing.max_size,
        };
        let thumbnail_width = match patch.thumbnail_width {
            Some(0) => {
                return Err(AppError::invalid(
                    "thumbnailWidth",
                    "Thumbnail width must be positive.",
                ))
            }
            Some(width) => width,
            None => existing.thumbnail_width,
        };
        let cropped_width = match patch.cropped_width {
            Some(0) => {
                return Err(AppError::invalid(
                    "croppedWidth",
                    "Cropped width must be positive.",
                ))
            }
            Some(width) => width,
            None => existing.cropped_width,
        };

        let updated = UploadProfile {
            name: patch.name.clone().unwrap_or(existing.name),
            crop: patch.crop.unwrap_or(existing.crop),
            max_size,
            aspect_ratio,
            thumbnail_width,
            cropped_width,
            updated_at: Utc::now(),
            ..existing
        };

        let result = sqlx::query(
            "UPDATE upload_profiles SET name = ?, crop = ?, max_size = ?, aspect_ratio = ?, \
             thumbnail_width = ?, cropped_width = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&updated.name)
        .bind(updated.crop)
        .bind(updated.max_size)
        .bind(updated.aspect_ratio.to_colon_string())
        .bind(updated.thumbnail_width as i64)
        .bind(updated.cropped_width as i64)
        .bind(updated.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotModified(format!("upload profile {}", id)));
        }

        Ok(updated)
    }

    /// Remove the catalog entry. Provisioned directories and files already
    /// referenced by owning records are left on disk.
    #[tracing::instrument(skip(self), fields(db.table = "upload_profiles", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<UploadProfile, AppError> {
        let Some(profile) = self.get(id).await? else {
            return Err(AppError::NotFound(format!("upload profile {}", id)));
        };

        let result = sqlx::query("DELETE FROM upload_profiles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("upload profile {}", id)));
        }

        Ok(profile)
    }
}

#[async_trait]
impl ProfileDirectory for UploadProfileRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<UploadProfile>, AppError> {
        self.by_slug(slug).await
    }
}

fn profile_from_row(row: &SqliteRow) -> Result<UploadProfile, AppError> {
    let ratio_raw: String = row.try_get("aspect_ratio")?;
    let aspect_ratio = AspectRatio::parse(&ratio_raw)
        .map_err(|e| AppError::Internal(format!("stored aspect ratio is corrupt: {}", e)))?;

    Ok(UploadProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        crop: row.try_get("crop")?,
        max_size: row.try_get("max_size")?,
        aspect_ratio,
        thumbnail_width: row.try_get::<i64, _>("thumbnail_width")? as u32,
        cropped_width: row.try_get::<i64, _>("cropped_width")? as u32,
        original_path: row.try_get("original_path")?,
        cropped_path: row.try_get("cropped_path")?,
        thumbnails_path: row.try_get("thumbnails_path")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

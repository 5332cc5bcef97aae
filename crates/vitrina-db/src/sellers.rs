//! Repository for sellers, doubling as the pipeline accessor for the
//! `sellers` upload profile.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use vitrina_core::models::seller::{Seller, ValidatedSeller};
use vitrina_core::{AppError, ImageSet, OwnerAccessor, OwnerRecord, Page, PageQuery};

use crate::{image_from_row, is_unique_violation};

const COLUMNS: &str = "id, name, slug, description, address, city, country, email, \
     image_original, image_thumbnail, image_cropped, promotions, created_by, \
     created_at, updated_at";

#[derive(Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, valid), fields(db.table = "sellers", db.operation = "insert"))]
    pub async fn create(
        &self,
        valid: &ValidatedSeller,
        created_by: Option<Uuid>,
    ) -> Result<Seller, AppError> {
        let seller = Seller {
            id: Uuid::new_v4(),
            name: valid.name.clone(),
            slug: valid.slug.clone(),
            description: valid.description.clone(),
            address: valid.address.clone(),
            city: valid.city.clone(),
            country: valid.country.clone(),
            email: valid.email.clone(),
            image: ImageSet::default(),
            promotions: 0,
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO sellers (id, name, slug, description, address, city, country, email, \
             promotions, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(seller.id)
        .bind(&seller.name)
        .bind(&seller.slug)
        .bind(&seller.description)
        .bind(&seller.address)
        .bind(&seller.city)
        .bind(&seller.country)
        .bind(&seller.email)
        .bind(seller.created_by)
        .bind(seller.created_at)
        .bind(seller.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(seller),
            Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(format!(
                "seller '{}' already exists",
                seller.name
            ))),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "sellers", db.operation = "select"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Seller>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM sellers WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| seller_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "sellers", db.operation = "select"))]
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Seller>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM sellers WHERE slug = ?", COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| seller_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "sellers", db.operation = "select"))]
    pub async fn list(&self, query: &PageQuery) -> Result<Page<Seller>, AppError> {
        let pattern = format!("%{}%", query.query);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sellers WHERE name LIKE ?")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let sort = match query.sort.as_deref() {
            Some("name") => "name",
            Some("promotions") => "promotions",
            _ => "created_at",
        };
        let direction = if query.descending() { "DESC" } else { "ASC" };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM sellers WHERE name LIKE ? ORDER BY {} {} LIMIT ? OFFSET ?",
            COLUMNS, sort, direction
        ))
        .bind(&pattern)
        .bind(query.limit() as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(seller_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, query))
    }

    #[tracing::instrument(skip(self), fields(db.table = "sellers", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<Seller, AppError> {
        let Some(seller) = self.get(id).await? else {
            return Err(AppError::NotFound(format!("seller {}", id)));
        };

        sqlx::query("DELETE FROM sellers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(seller)
    }
}

#[async_trait]
impl OwnerAccessor for SellerRepository {
    async fn load(&self, id: Uuid) -> Result<Option<OwnerRecord>, AppError> {
        Ok(self.get(id).await?.map(|seller| OwnerRecord {
            id: seller.id,
            natural_slug: seller.slug,
            created_at: seller.created_at,
            image: seller.image,
        }))
    }

    async fn save_image(&self, id: Uuid, image: &ImageSet) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE sellers SET image_original = ?, image_thumbnail = ?, image_cropped = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&image.original)
        .bind(&image.thumbnail)
        .bind(&image.cropped)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("seller {}", id)));
        }
        Ok(())
    }
}

fn seller_from_row(row: &SqliteRow) -> Result<Seller, AppError> {
    Ok(Seller {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        email: row.try_get("email")?,
        image: image_from_row(row)?,
        promotions: row.try_get("promotions")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

//! Repository for promotions, doubling as the pipeline accessor for the
//! `promotions` upload profile.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use vitrina_core::models::promotion::{Promotion, ValidatedPromotion};
use vitrina_core::{AppError, ImageSet, OwnerAccessor, OwnerRecord, Page, PageQuery};

use crate::{image_from_row, is_unique_violation};

const COLUMNS: &str = "id, title, slug, description, seller_id, original_price, \
     discounted_price, active, expiry, image_original, image_thumbnail, image_cropped, \
     created_by, created_at, updated_at";

#[derive(Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a promotion and bump the seller's denormalized count.
    #[tracing::instrument(skip(self, valid), fields(db.table = "promotions", db.operation = "insert"))]
    pub async fn create(
        &self,
        valid: &ValidatedPromotion,
        created_by: Option<Uuid>,
    ) -> Result<Promotion, AppError> {
        let promotion = Promotion {
            id: Uuid::new_v4(),
            title: valid.title.clone(),
            slug: valid.slug.clone(),
            description: valid.description.clone(),
            seller_id: valid.seller_id,
            original_price: valid.original_price,
            discounted_price: valid.discounted_price,
            active: true,
            expiry: valid.expiry,
            image: ImageSet::default(),
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO promotions (id, title, slug, description, seller_id, original_price, \
             discounted_price, active, expiry, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?, ?)",
        )
        .bind(promotion.id)
        .bind(&promotion.title)
        .bind(&promotion.slug)
        .bind(&promotion.description)
        .bind(promotion.seller_id)
        .bind(promotion.original_price)
        .bind(promotion.discounted_price)
        .bind(promotion.expiry)
        .bind(promotion.created_by)
        .bind(promotion.created_at)
        .bind(promotion.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                sqlx::query("UPDATE sellers SET promotions = promotions + 1 WHERE id = ?")
                    .bind(promotion.seller_id)
                    .execute(&self.pool)
                    .await?;
                Ok(promotion)
            }
            Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(format!(
                "promotion '{}' already exists",
                promotion.title
            ))),
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "promotions", db.operation = "select"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Promotion>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM promotions WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| promotion_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "promotions", db.operation = "select"))]
    pub async fn by_slug(&self, slug: &str) -> Result<Option<Promotion>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM promotions WHERE slug = ?", COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| promotion_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "promotions", db.operation = "select"))]
    pub async fn list(&self, query: &PageQuery) -> Result<Page<Promotion>, AppError> {
        self.list_filtered(query, None).await
    }

    /// List one seller's promotions, newest first.
    #[tracing::instrument(skip(self, query), fields(db.table = "promotions", db.operation = "select"))]
    pub async fn list_for_seller(
        &self,
        seller_id: Uuid,
        query: &PageQuery,
    ) -> Result<Page<Promotion>, AppError> {
        self.list_filtered(query, Some(seller_id)).await
    }

    async fn list_filtered(
        &self,
        query: &PageQuery,
        seller_id: Option<Uuid>,
    ) -> Result<Page<Promotion>, AppError> {
        let pattern = format!("%{}%", query.query);
        let seller_clause = if seller_id.is_some() {
            " AND seller_id = ?"
        } else {
            ""
        };

        let count_sql = format!(
            "SELECT COUNT(*) FROM promotions WHERE title LIKE ?{}",
            seller_clause
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(&pattern);
        if let Some(seller_id) = seller_id {
            count_query = count_query.bind(seller_id);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let sort = match query.sort.as_deref() {
            Some("title") => "title",
            Some("expiry") => "expiry",
            _ => "created_at",
        };
        let direction = if query.descending() { "DESC" } else { "ASC" };

        let rows_sql = format!(
            "SELECT {} FROM promotions WHERE title LIKE ?{} ORDER BY {} {} LIMIT ? OFFSET ?",
            COLUMNS, seller_clause, sort, direction
        );
        let mut rows_query = sqlx::query(&rows_sql).bind(&pattern);
        if let Some(seller_id) = seller_id {
            rows_query = rows_query.bind(seller_id);
        }
        let rows = rows_query
            .bind(query.limit() as i64)
            .bind(query.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .iter()
            .map(promotion_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, query))
    }

    #[tracing::instrument(skip(self), fields(db.table = "promotions", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<Promotion, AppError> {
        let Some(promotion) = self.get(id).await? else {
            return Err(AppError::NotFound(format!("promotion {}", id)));
        };

        sqlx::query("DELETE FROM promotions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "UPDATE sellers SET promotions = MAX(promotions - 1, 0) WHERE id = ?",
        )
        .bind(promotion.seller_id)
        .execute(&self.pool)
        .await?;

        Ok(promotion)
    }
}

#[async_trait]
impl OwnerAccessor for PromotionRepository {
    async fn load(&self, id: Uuid) -> Result<Option<OwnerRecord>, AppError> {
        Ok(self.get(id).await?.map(|promotion| OwnerRecord {
            id: promotion.id,
            natural_slug: promotion.slug,
            created_at: promotion.created_at,
            image: promotion.image,
        }))
    }

    async fn save_image(&self, id: Uuid, image: &ImageSet) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE promotions SET image_original = ?, image_thumbnail = ?, image_cropped = ?, \
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
            return Err(AppError::NotFound(format!("promotion {}", id)));
        }
        Ok(())
    }
}

fn promotion_from_row(row: &SqliteRow) -> Result<Promotion, AppError> {
    Ok(Promotion {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        seller_id: row.try_get("seller_id")?,
        original_price: row.try_get("original_price")?,
        discounted_price: row.try_get("discounted_price")?,
        active: row.try_get("active")?,
        expiry: row.try_get("expiry")?,
        image: image_from_row(row)?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::test_pool;
    use crate::sellers::SellerRepository;
    use vitrina_core::models::promotion::PromotionDraft;
    use vitrina_core::models::seller::SellerDraft;

    async fn seeded(pool: &SqlitePool) -> (PromotionRepository, Uuid) {
        let sellers = SellerRepository::new(pool.clone());
        let seller = sellers
            .create(
                &SellerDraft {
                    name: Some("Fresh Mart".to_string()),
                    ..Default::default()
                }
                .validate()
                .unwrap(),
                None,
            )
            .await
            .unwrap();
        (PromotionRepository::new(pool.clone()), seller.id)
    }

    fn valid_promotion(title: &str, seller_id: Uuid) -> ValidatedPromotion {
        PromotionDraft {
            title: Some(title.to_string()),
            seller: Some(seller_id),
            original_price: Some(100.0),
            discounted_price: Some(60.0),
            expiry: Some(Utc::now()),
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn create_bumps_the_seller_count() {
        let pool = test_pool().await;
        let (repo, seller_id) = seeded(&pool).await;

        repo.create(&valid_promotion("Half Price Friday", seller_id), None)
            .await
            .unwrap();

        let sellers = SellerRepository::new(pool.clone());
        assert_eq!(sellers.get(seller_id).await.unwrap().unwrap().promotions, 1);
    }

    #[tokio::test]
    async fn delete_returns_record_and_decrements_count() {
        let pool = test_pool().await;
        let (repo, seller_id) = seeded(&pool).await;
        let created = repo
            .create(&valid_promotion("Half Price Friday", seller_id), None)
            .await
            .unwrap();

        let deleted = repo.delete(created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);

        let sellers = SellerRepository::new(pool.clone());
        assert_eq!(sellers.get(seller_id).await.unwrap().unwrap().promotions, 0);

        let err = repo.delete(created.id).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn listing_scopes_to_a_seller() {
        let pool = test_pool().await;
        let (repo, seller_id) = seeded(&pool).await;
        repo.create(&valid_promotion("Half Price Friday", seller_id), None)
            .await
            .unwrap();
        repo.create(&valid_promotion("Two For One", seller_id), None)
            .await
            .unwrap();

        let page = repo
            .list_for_seller(seller_id, &PageQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        let none = repo
            .list_for_seller(Uuid::new_v4(), &PageQuery::default())
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }
}

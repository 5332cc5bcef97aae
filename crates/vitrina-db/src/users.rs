//! Repository for dashboard users, doubling as the pipeline accessor for the
//! `users` upload profile.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use vitrina_core::models::user::{User, ValidatedUser};
use vitrina_core::{slugify, AppError, ImageSet, OwnerAccessor, OwnerRecord, Page, PageQuery};

use crate::{image_from_row, is_unique_violation};

const COLUMNS: &str = "id, first_name, last_name, full_name, email, role, password_hash, \
     image_original, image_thumbnail, image_cropped, created_by, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user. The caller hashes the password; this layer never
    /// sees plaintext.
    #[tracing::instrument(skip(self, valid, password_hash), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create(
        &self,
        valid: &ValidatedUser,
        password_hash: String,
        created_by: Option<Uuid>,
    ) -> Result<User, AppError> {
        let user = User {
            id: Uuid::new_v4(),
            first_name: valid.first_name.clone(),
            last_name: valid.last_name.clone(),
            full_name: valid.full_name.clone(),
            email: valid.email.clone(),
            role: valid.role,
            password_hash,
            image: ImageSet::default(),
            created_by,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = sqlx::query(
            "INSERT INTO users (id, first_name, last_name, full_name, email, role, \
             password_hash, created_by, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(user.role.to_string())
        .bind(&user.password_hash)
        .bind(user.created_by)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::Conflict("user already exists".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn get(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", COLUMNS))
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "users", db.operation = "select"))]
    pub async fn list(&self, query: &PageQuery) -> Result<Page<User>, AppError> {
        let pattern = format!("%{}%", query.query);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE full_name LIKE ?")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let sort = match query.sort.as_deref() {
            Some("fullName") => "full_name",
            Some("email") => "email",
            _ => "created_at",
        };
        let direction = if query.descending() { "DESC" } else { "ASC" };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE full_name LIKE ? ORDER BY {} {} LIMIT ? OFFSET ?",
            COLUMNS, sort, direction
        ))
        .bind(&pattern)
        .bind(query.limit() as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, query))
    }

    /// Rename a user; `full_name` stays derived.
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_name(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, AppError> {
        let full_name = format!("{} {}", first_name, last_name);
        let result = sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, full_name = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(&full_name)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotModified(format!("user {}", id)));
        }

        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
    }

    #[tracing::instrument(skip(self, password_hash), fields(db.table = "users", db.operation = "update"))]
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotModified(format!("user {}", id)));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<User, AppError> {
        let Some(user) = self.get(id).await? else {
            return Err(AppError::NotFound(format!("user {}", id)));
        };

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn count(&self) -> Result<i64, AppError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }
}

#[async_trait]
impl OwnerAccessor for UserRepository {
    async fn load(&self, id: Uuid) -> Result<Option<OwnerRecord>, AppError> {
        Ok(self.get(id).await?.map(|user| OwnerRecord {
            id: user.id,
            natural_slug: slugify(&user.full_name),
            created_at: user.created_at,
            image: user.image,
        }))
    }

    async fn save_image(&self, id: Uuid, image: &ImageSet) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET image_original = ?, image_thumbnail = ?, image_cropped = ?, \
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
            return Err(AppError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, AppError> {
    let role_raw: String = row.try_get("role")?;
    let role = role_raw
        .parse()
        .map_err(|e: String| AppError::Internal(format!("stored role is corrupt: {}", e)))?;

    Ok(User {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        role,
        password_hash: row.try_get("password_hash")?,
        image: image_from_row(row)?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

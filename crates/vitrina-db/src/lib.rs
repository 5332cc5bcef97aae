//! SQLite-backed repositories for the catalog: upload profiles and the three
//! owning-record stores. Each owning-record repository also implements the
//! pipeline's `OwnerAccessor`, and the profile repository implements
//! `ProfileDirectory`, so the orchestrator can be wired without knowing any
//! database types.

pub mod pool;
pub mod promotions;
pub mod sellers;
pub mod upload_profiles;
pub mod users;

pub use pool::{connect, init_schema};
pub use promotions::PromotionRepository;
pub use sellers::SellerRepository;
pub use upload_profiles::UploadProfileRepository;
pub use users::UserRepository;

/// Return true if a SQLx error indicates a unique constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}

/// Decode the three image columns every owning-record table carries.
pub(crate) fn image_from_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<vitrina_core::ImageSet, sqlx::Error> {
    use sqlx::Row;
    Ok(vitrina_core::ImageSet {
        original: row.try_get("image_original")?,
        thumbnail: row.try_get("image_thumbnail")?,
        cropped: row.try_get("image_cropped")?,
    })
}

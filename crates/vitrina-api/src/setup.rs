//! First-run bootstrap: seed the initial super user so the dashboard can be
//! reached at all on a fresh database.

use std::env;
use vitrina_core::models::user::{Role, UserDraft};
use vitrina_core::AppError;

use crate::state::AppState;

const DEFAULT_ADMIN_EMAIL: &str = "super@admin.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin1";

/// Create the initial super user when the user table is empty. Email and
/// password come from `SETUP_ADMIN_EMAIL` / `SETUP_ADMIN_PASSWORD`, with
/// development defaults.
pub async fn seed_super_user(state: &AppState) -> Result<(), anyhow::Error> {
    if state.users.count().await? > 0 {
        return Ok(());
    }

    let email = env::var("SETUP_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let password =
        env::var("SETUP_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

    let valid = UserDraft {
        first_name: Some("Admin".to_string()),
        last_name: Some("Super".to_string()),
        email: Some(email.clone()),
        role: Some(Role::SuperUser),
        password: Some(password),
    }
    .validate()
    .map_err(|e| anyhow::anyhow!("invalid setup credentials: {}", e))?;

    let password_hash = bcrypt::hash(&valid.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;

    state.users.create(&valid, password_hash, None).await?;
    tracing::warn!(
        email = %email,
        "Seeded initial super user; change this password before going anywhere near production"
    );
    Ok(())
}

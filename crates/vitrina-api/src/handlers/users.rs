//! User management. Creation and deletion are super-user operations; users
//! manage their own name and password.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use vitrina_core::models::user::{User, UserDraft};
use vitrina_core::{AppError, FieldError, Page, PageQuery};

use crate::auth::Principal;
use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(draft): Json<UserDraft>,
) -> Result<Json<User>, HttpAppError> {
    let valid = draft.validate()?;
    let password_hash = bcrypt::hash(&valid.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;

    let user = state
        .users
        .create(&valid, password_hash, Some(principal.id))
        .await?;

    tracing::info!(user = %user.email, by = %principal.email, "Created user");
    Ok(Json(user))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<User>>, HttpAppError> {
    Ok(Json(state.users.list(&query).await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, HttpAppError> {
    let user = state
        .users
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNameRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Users may rename themselves; a super user may rename anyone.
pub async fn change_name(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<ChangeNameRequest>,
) -> Result<Json<User>, HttpAppError> {
    if principal.id != id && !principal.is_super_user() {
        return Err(AppError::Forbidden("You may only rename your own account".to_string()).into());
    }

    let mut errors = Vec::new();
    let first_name = match body.first_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            errors.push(FieldError::new(
                "firstName",
                "Please provide the user's first name.",
            ));
            String::new()
        }
    };
    let last_name = match body.last_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            errors.push(FieldError::new(
                "lastName",
                "Please provide the user's last name.",
            ));
            String::new()
        }
    };
    if !errors.is_empty() {
        return Err(AppError::Validation(errors).into());
    }

    let user = state.users.update_name(id, &first_name, &last_name).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub password: Option<String>,
    pub confirmation: Option<String>,
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, HttpAppError> {
    let mut errors = Vec::new();
    if body.current_password.as_deref().unwrap_or("").is_empty() {
        errors.push(FieldError::new(
            "currentPassword",
            "Please provide the current password.",
        ));
    }
    let password = body.password.as_deref().unwrap_or("");
    if password.is_empty() {
        errors.push(FieldError::new("password", "Please provide a new password."));
    } else if password.len() < 6 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 6 characters.",
        ));
    }
    if body.confirmation.as_deref() != Some(password) {
        errors.push(FieldError::new(
            "confirmation",
            "Your passwords do not match.",
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors).into());
    }

    let user = state
        .users
        .get(principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", principal.id)))?;

    let current = body.current_password.as_deref().unwrap_or("");
    let verified = bcrypt::verify(current, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))?;
    if !verified {
        return Err(AppError::Unauthorized("Current password is incorrect".to_string()).into());
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;
    state.users.update_password(principal.id, &password_hash).await?;

    Ok(Json(serde_json::json!({ "status": "password changed" })))
}

/// Delete a user and every pipeline-managed file the record still points at;
/// placeholder assets outside the uploads tree are untouched.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, HttpAppError> {
    let user = state.users.delete(id).await?;
    state
        .store
        .remove_all(user.image.managed_paths())
        .await
        .map_err(AppError::from)?;

    tracing::info!(user = %user.email, "Deleted user");
    Ok(Json(user))
}

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use vitrina_core::models::user::User;
use vitrina_core::AppError;

use crate::auth::{issue_token, Principal};
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpAppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let user = state
        .users
        .by_email(&body.email)
        .await?
        .ok_or_else(invalid)?;

    let verified = bcrypt::verify(&body.password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("password verification failed: {}", e)))?;
    if !verified {
        return Err(invalid().into());
    }

    let token = issue_token(
        &user,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    tracing::info!(user = %user.email, "User logged in");
    Ok(Json(LoginResponse { token, user }))
}

/// The authenticated caller's own record.
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<User>, HttpAppError> {
    let user = state
        .users
        .get(principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {}", principal.id)))?;
    Ok(Json(user))
}

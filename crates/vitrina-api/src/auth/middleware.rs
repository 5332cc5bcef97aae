use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use vitrina_core::AppError;

use crate::auth::{verify_token, Principal};
use crate::error::HttpAppError;
use crate::state::AppState;

/// Authenticate the request from its bearer token and stash the principal in
/// request extensions. The token's subject must still exist as a user.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthorized(
                "Missing authorization header".to_string(),
            ))
            .into_response()
        }
    };

    // The dashboard sends either "Bearer <token>" or the raw token.
    let token = header.strip_prefix("Bearer ").unwrap_or(header);

    let claims = match verify_token(token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(err) => return HttpAppError(err).into_response(),
    };

    let user = match state.users.get(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpAppError(AppError::Forbidden("Invalid token".to_string())).into_response()
        }
        Err(err) => return HttpAppError(err).into_response(),
    };

    let principal = Principal {
        id: user.id,
        role: user.role,
        email: user.email,
        full_name: user.full_name,
    };
    request.extensions_mut().insert(principal);

    next.run(request).await
}

/// Gate for profile management and user management: the authenticated
/// principal must hold the super-user role. Layered inside `require_auth`.
pub async fn require_super_user(request: Request, next: Next) -> Response {
    match request.extensions().get::<Principal>() {
        Some(principal) if principal.is_super_user() => next.run(request).await,
        Some(_) => HttpAppError(AppError::Forbidden(
            "Super user role required".to_string(),
        ))
        .into_response(),
        None => HttpAppError(AppError::Unauthorized(
            "Missing authentication".to_string(),
        ))
        .into_response(),
    }
}

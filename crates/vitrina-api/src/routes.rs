//! Route table and middleware stacking.
//!
//! Three tiers: public reads and login, token-authenticated catalog and
//! pipeline routes, and super-user-only profile/user management. Pipeline
//! routes address the orchestrator as `/{kind}/{id}/image[/crop]`, where
//! `kind` is the upload-profile slug of the owning entity type.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::auth::middleware::{require_auth, require_super_user};
use crate::handlers::{login, media, promotions, sellers, upload_profiles, users};
use crate::state::AppState;

/// Generous cap for multipart bodies; per-profile `max_size` does the real
/// enforcement inside the pipeline.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/api/login", post(login::login))
        .route("/api/openapi.json", get(openapi))
        .route("/api/sellers", get(sellers::list_sellers))
        .route("/api/sellers/{slug}", get(sellers::get_seller))
        .route("/api/promotions", get(promotions::list_promotions))
        .route("/api/promotions/promo/{slug}", get(promotions::get_promotion))
        .route(
            "/api/promotions/seller/{slug}",
            get(promotions::list_seller_promotions),
        );

    let authenticated = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/user", get(login::current_user))
        .route("/api/users/{id}", get(users::get_user))
        .route("/api/users/{id}/change-name", put(users::change_name))
        .route(
            "/api/users/settings/change-password",
            put(users::change_password),
        )
        .route("/api/sellers", post(sellers::create_seller))
        .route("/api/sellers/{slug}", delete(sellers::delete_seller))
        .route("/api/promotions", post(promotions::create_promotion))
        .route("/api/promotions/{id}", delete(promotions::delete_promotion))
        .route("/api/upload-profiles", get(upload_profiles::list_profiles))
        .route("/api/upload-profiles/{slug}", get(upload_profiles::get_profile))
        .route("/api/{kind}/{id}/image", post(media::upload_image))
        .route("/api/{kind}/{id}/image/crop", post(media::crop_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route("/api/upload-profiles", post(upload_profiles::create_profile))
        .route(
            "/api/upload-profiles/{slug}",
            put(upload_profiles::update_profile).delete(upload_profiles::delete_profile),
        )
        .route("/api/users", post(users::create_user))
        .route("/api/users/{id}", delete(users::delete_user))
        .route_layer(middleware::from_fn(require_super_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

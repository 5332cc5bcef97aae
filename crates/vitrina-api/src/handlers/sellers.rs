//! Seller catalog routes. Listings are public; mutations require a token.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vitrina_core::models::seller::{Seller, SellerDraft};
use vitrina_core::{AppError, Page, PageQuery};

use crate::auth::Principal;
use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn create_seller(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(draft): Json<SellerDraft>,
) -> Result<Json<Seller>, HttpAppError> {
    let valid = draft.validate()?;
    let seller = state.sellers.create(&valid, Some(principal.id)).await?;
    tracing::info!(seller = %seller.slug, by = %principal.email, "Created seller");
    Ok(Json(seller))
}

pub async fn list_sellers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Seller>>, HttpAppError> {
    Ok(Json(state.sellers.list(&query).await?))
}

pub async fn get_seller(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Seller>, HttpAppError> {
    let seller = state
        .sellers
        .by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("seller '{}'", slug)))?;
    Ok(Json(seller))
}

/// Delete a seller; its pipeline-managed image files go with it.
pub async fn delete_seller(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Seller>, HttpAppError> {
    let seller = state.sellers.delete(id).await?;
    state
        .store
        .remove_all(seller.image.managed_paths())
        .await
        .map_err(AppError::from)?;

    tracing::info!(seller = %seller.slug, "Deleted seller");
    Ok(Json(seller))
}

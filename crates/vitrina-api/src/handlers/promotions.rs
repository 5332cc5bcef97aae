//! Promotion catalog routes. Listings are public; mutations require a token.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use vitrina_core::models::promotion::{Promotion, PromotionDraft};
use vitrina_core::{AppError, Page, PageQuery};

use crate::auth::Principal;
use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn create_promotion(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(draft): Json<PromotionDraft>,
) -> Result<Json<Promotion>, HttpAppError> {
    let valid = draft.validate()?;

    // The seller must exist before a promotion can point at it.
    if state.sellers.get(valid.seller_id).await?.is_none() {
        return Err(AppError::NotFound(format!("seller {}", valid.seller_id)).into());
    }

    let promotion = state.promotions.create(&valid, Some(principal.id)).await?;
    tracing::info!(promotion = %promotion.slug, by = %principal.email, "Created promotion");
    Ok(Json(promotion))
}

pub async fn list_promotions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Promotion>>, HttpAppError> {
    Ok(Json(state.promotions.list(&query).await?))
}

pub async fn get_promotion(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Promotion>, HttpAppError> {
    let promotion = state
        .promotions
        .by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("promotion '{}'", slug)))?;
    Ok(Json(promotion))
}

/// One seller's promotions, addressed by the seller's slug.
pub async fn list_seller_promotions(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Promotion>>, HttpAppError> {
    let seller = state
        .sellers
        .by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("seller '{}'", slug)))?;
    Ok(Json(
        state.promotions.list_for_seller(seller.id, &query).await?,
    ))
}

/// Delete a promotion; its pipeline-managed image files go with it.
pub async fn delete_promotion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Promotion>, HttpAppError> {
    let promotion = state.promotions.delete(id).await?;
    state
        .store
        .remove_all(promotion.image.managed_paths())
        .await
        .map_err(AppError::from)?;

    tracing::info!(promotion = %promotion.slug, "Deleted promotion");
    Ok(Json(promotion))
}

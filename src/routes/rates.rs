//! Rate configuration endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    models::{DefaultRates, RateCard, UpdateRates},
};

use super::error::ApiError;

pub async fn get_default_rates(
    State(state): State<AppState>,
) -> Result<Json<DefaultRates>, ApiError> {
    let rates = state.services.rate_configs.get_default().await?;
    Ok(Json(rates))
}

pub async fn put_default_rates(
    State(state): State<AppState>,
    Json(update): Json<UpdateRates>,
) -> Result<Json<DefaultRates>, ApiError> {
    let rates = state.services.rate_configs.update_default(update).await?;
    Ok(Json(rates))
}

pub async fn get_rate_card(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<Json<RateCard>, ApiError> {
    let card = state
        .services
        .rate_configs
        .get_rate_card(location_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no rate card for location {location_id}")))?;
    Ok(Json(card))
}

pub async fn put_rate_card(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(update): Json<UpdateRates>,
) -> Result<Json<RateCard>, ApiError> {
    let card = state
        .services
        .rate_configs
        .upsert_rate_card(location_id, update)
        .await?;
    Ok(Json(card))
}

//! Recommendation, season and success handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::UserProfile;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::recommendation::{RecommendationList, SpeciesSeason, SpeciesSuccess};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub profile: UserProfile,
    /// Defaults to the configured threshold
    pub min_score: Option<u8>,
    /// Biases scores by similar users' reactions when present
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesProfileRequest {
    #[serde(default)]
    pub profile: UserProfile,
}

/// Rank the catalog for a profile
pub async fn recommend(
    State(state): State<AppState>,
    Json(input): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationList>> {
    let min_score = input
        .min_score
        .unwrap_or(state.config.recommendation.min_score);
    let list = state
        .recommendations()
        .recommend(input.profile, min_score, input.user_id)
        .await?;
    Ok(Json(list))
}

/// Planting-season advice for one species
pub async fn species_season(
    State(state): State<AppState>,
    Path(species_id): Path<String>,
    Json(input): Json<SpeciesProfileRequest>,
) -> AppResult<Json<SpeciesSeason>> {
    let today = Utc::now().date_naive();
    let season = state
        .recommendations()
        .season(&species_id, input.profile, today)
        .await?;
    Ok(Json(season))
}

/// Success-probability estimate for one species
pub async fn species_success(
    State(state): State<AppState>,
    Path(species_id): Path<String>,
    Json(input): Json<SpeciesProfileRequest>,
) -> AppResult<Json<SpeciesSuccess>> {
    let today = Utc::now().date_naive();
    let success = state
        .recommendations()
        .success(&species_id, input.profile, today)
        .await?;
    Ok(Json(success))
}

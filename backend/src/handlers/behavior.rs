//! Behavior ledger handlers

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{BehaviorAction, BehaviorEvent};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordEventRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 64))]
    pub tree_id: String,
    pub action: BehaviorAction,
    pub region: Option<String>,
    pub agro_zone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GoalsRequest {
    #[validate(length(max = 32))]
    pub goals: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
pub struct LikelihoodQuery {
    pub user_id: Uuid,
    pub tree_id: String,
}

#[derive(Debug, Serialize)]
pub struct LikelihoodResponse {
    pub user_id: Uuid,
    pub tree_id: String,
    pub likelihood: f64,
}

/// Append a behavior event, stamped with the server clock
pub async fn record_event(
    State(state): State<AppState>,
    Json(input): Json<RecordEventRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;
    if state.catalog.get(&input.tree_id).is_none() {
        return Err(AppError::NotFound(format!("Species {}", input.tree_id)));
    }

    state
        .ledger
        .record(BehaviorEvent {
            user_id: input.user_id,
            tree_id: input.tree_id,
            action: input.action,
            timestamp: Utc::now(),
            region: input.region,
            agro_zone: input.agro_zone,
        })
        .await?;

    Ok(StatusCode::CREATED)
}

/// Replace a user's conservation goals
pub async fn set_goals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<GoalsRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;
    state.ledger.register_goals(user_id, &input.goals).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Likelihood that a user will like a species, from similar users
pub async fn get_likelihood(
    State(state): State<AppState>,
    Query(query): Query<LikelihoodQuery>,
) -> AppResult<Json<LikelihoodResponse>> {
    let likelihood = state
        .ledger
        .similar_user_likelihood(query.user_id, &query.tree_id)
        .await?;
    Ok(Json(LikelihoodResponse {
        user_id: query.user_id,
        tree_id: query.tree_id,
        likelihood,
    }))
}

//! Zone resolution handler

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{GpsCoordinates, ZoneInfo};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Either coordinates or a region name
#[derive(Debug, Deserialize)]
pub struct ResolveZoneRequest {
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub region: Option<String>,
}

pub async fn resolve_zone(
    State(state): State<AppState>,
    Json(input): Json<ResolveZoneRequest>,
) -> AppResult<Json<ZoneInfo>> {
    let zone = match (input.latitude, input.longitude, input.region.as_deref()) {
        (Some(latitude), Some(longitude), _) => {
            let coordinates = GpsCoordinates::try_new(latitude, longitude)?;
            state.zones.resolve_zone(coordinates).await?
        }
        (None, None, Some(region)) if !region.trim().is_empty() => state.zones.resolve_region(region),
        _ => {
            return Err(AppError::ValidationError(
                "Provide latitude and longitude, or a region".to_string(),
            ))
        }
    };

    Ok(Json(zone))
}

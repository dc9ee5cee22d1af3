//! Location acquisition handlers

use axum::{extract::State, Json};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{LocationSample, WeatherSnapshot, ZoneInfo};
use std::net::IpAddr;
use std::sync::Arc;
use validator::Validate;

use super::{validate_latitude, validate_longitude};
use crate::error::{AppError, AppResult};
use crate::services::{fetch_optional, manual_location, GpsFix, LocationAcquirer, ReportedGps};
use crate::AppState;

/// A GPS fix reported by the client device
#[derive(Debug, Deserialize, Validate)]
pub struct ReportedGpsInput {
    #[validate(custom = "validate_latitude")]
    pub latitude: Decimal,
    #[validate(custom = "validate_longitude")]
    pub longitude: Decimal,
    pub accuracy_meters: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AcquireLocationRequest {
    /// Cache partition (device or session)
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    /// Absent when the device denied permission or has no fix
    #[validate]
    pub reported_gps: Option<ReportedGpsInput>,
    pub client_ip: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ManualLocationRequest {
    #[validate(length(min = 1, max = 128))]
    pub session_id: String,
    #[validate(custom = "validate_latitude")]
    pub latitude: Decimal,
    #[validate(custom = "validate_longitude")]
    pub longitude: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub location: LocationSample,
    pub zone: ZoneInfo,
    pub weather: Option<WeatherSnapshot>,
}

async fn describe(
    state: &AppState,
    session_id: &str,
    location: LocationSample,
) -> AppResult<LocationResponse> {
    let zone = state.zones.resolve_zone(location.coordinates).await?;
    let weather = fetch_optional(state.weather.as_ref(), Some(location.coordinates)).await;
    if let Some(weather) = &weather {
        state
            .location_cache
            .attach_weather(session_id, weather.clone(), Utc::now())
            .await;
    }
    Ok(LocationResponse {
        location,
        zone,
        weather,
    })
}

/// Acquire a location: cache, then reported GPS, then IP geolocation
pub async fn acquire_location(
    State(state): State<AppState>,
    Json(input): Json<AcquireLocationRequest>,
) -> AppResult<Json<LocationResponse>> {
    input.validate()?;

    let fix = input.reported_gps.map(|gps| GpsFix {
        latitude: gps.latitude,
        longitude: gps.longitude,
        accuracy_meters: gps.accuracy_meters,
    });
    let ip = match input.client_ip.as_deref().map(str::trim) {
        Some(raw) => {
            let addr: IpAddr = raw
                .parse()
                .map_err(|_| AppError::validation("client_ip", "Not a valid IP address"))?;
            state.ip_locator.for_ip(addr)
        }
        None => state.ip_locator.clone(),
    };

    let acquirer = LocationAcquirer::new(
        state.location_cache.clone(),
        Arc::new(ReportedGps::new(fix)),
        Arc::new(ip),
        state.gps_timeout(),
    );
    let location = acquirer.acquire_location(&input.session_id).await?;

    Ok(Json(describe(&state, &input.session_id, location).await?))
}

/// Record a manually entered location
pub async fn set_manual_location(
    State(state): State<AppState>,
    Json(input): Json<ManualLocationRequest>,
) -> AppResult<Json<LocationResponse>> {
    input.validate()?;

    let now = Utc::now();
    let location = manual_location(input.latitude, input.longitude, now)?;
    state
        .location_cache
        .put(&input.session_id, &location, now)
        .await;

    Ok(Json(describe(&state, &input.session_id, location).await?))
}

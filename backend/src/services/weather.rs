//! Weather lookup for scoring
//!
//! Missing weather is never an error for scoring: the bonus and the weather
//! factor fall back to their neutral defaults.

use shared::{validate_weather, GpsCoordinates, WeatherSnapshot};

use crate::error::{AppError, AppResult};

/// Weather collaborator
#[axum::async_trait]
pub trait WeatherGateway: Send + Sync {
    async fn current_conditions(&self, coordinates: GpsCoordinates) -> AppResult<WeatherSnapshot>;
}

/// Gateway used when no weather API key is configured
pub struct UnconfiguredWeather;

#[axum::async_trait]
impl WeatherGateway for UnconfiguredWeather {
    async fn current_conditions(&self, _coordinates: GpsCoordinates) -> AppResult<WeatherSnapshot> {
        Err(AppError::WeatherServiceUnavailable)
    }
}

/// Fetch weather for an optional location, degrading to `None` on any failure
pub async fn fetch_optional(
    gateway: &dyn WeatherGateway,
    location: Option<GpsCoordinates>,
) -> Option<WeatherSnapshot> {
    let coordinates = location?;
    match gateway.current_conditions(coordinates).await {
        Ok(weather) => match validate_weather(&weather) {
            Ok(()) => Some(weather),
            Err(reason) => {
                tracing::warn!("Discarding implausible weather snapshot: {}", reason);
                None
            }
        },
        Err(e) => {
            tracing::warn!("Weather unavailable, scoring without it: {}", e);
            None
        }
    }
}

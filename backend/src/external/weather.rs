//! OpenWeatherMap client
//!
//! Only current conditions are used. Annual rainfall is not reported by the
//! current-weather endpoint, so it is estimated from humidity and the last
//! hour of rain.

use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{GpsCoordinates, WeatherSnapshot};

use super::{http_client, request_error};
use crate::error::{AppError, AppResult};
use crate::services::weather::WeatherGateway;

const RAINFALL_PER_HUMIDITY_POINT_MM: i64 = 14;
const RAINFALL_PER_HOURLY_MM: i64 = 100;
const MAX_ESTIMATED_RAINFALL_MM: i64 = 4000;

/// OpenWeatherMap current-weather client
#[derive(Clone)]
pub struct OpenWeatherMapClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    main: OWMMain,
    rain: Option<OWMRain>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl OpenWeatherMapClient {
    pub fn new(api_key: String, timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(
            api_key,
            "https://api.openweathermap.org/data/2.5".to_string(),
            timeout,
        )
    }

    /// Client against a custom base URL
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn convert(data: OWMCurrentResponse) -> WeatherSnapshot {
        let rain_1h = data
            .rain
            .and_then(|r| r.one_hour)
            .and_then(Decimal::from_f64_retain)
            .unwrap_or_default();

        WeatherSnapshot::new(
            Decimal::from_f64_retain(data.main.temp)
                .unwrap_or_default()
                .round_dp(1),
            data.main.humidity,
            estimate_annual_rainfall(data.main.humidity, rain_1h),
        )
    }
}

/// Rough annual rainfall estimate (mm) from current humidity and hourly rain
pub fn estimate_annual_rainfall(humidity_percent: i32, rain_1h_mm: Decimal) -> Decimal {
    let estimate = Decimal::from(i64::from(humidity_percent.clamp(0, 100)) * RAINFALL_PER_HUMIDITY_POINT_MM)
        + rain_1h_mm.max(Decimal::ZERO) * Decimal::from(RAINFALL_PER_HOURLY_MM);
    estimate
        .min(Decimal::from(MAX_ESTIMATED_RAINFALL_MM))
        .round_dp(0)
}

#[axum::async_trait]
impl WeatherGateway for OpenWeatherMapClient {
    async fn current_conditions(&self, coordinates: GpsCoordinates) -> AppResult<WeatherSnapshot> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, coordinates.latitude, coordinates.longitude, self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error("Weather API", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        let data: OWMCurrentResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse weather response: {}", e))
        })?;

        Ok(Self::convert(data))
    }
}

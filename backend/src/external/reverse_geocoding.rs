//! Nominatim reverse geocoding

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use shared::GpsCoordinates;

use super::{http_client, request_error};
use crate::error::{AppError, AppResult};
use crate::services::zone::{ReverseGeocode, ReverseGeocoder};

#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    endpoint: String,
    user_agent: String,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    county: Option<String>,
    state: Option<String>,
    state_district: Option<String>,
}

impl NominatimClient {
    /// Nominatim requires an identifying User-Agent
    pub fn new(
        endpoint: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        })
    }
}

// Kenyan counties come back as `county` or `state` depending on the area.
fn to_reverse_geocode(data: NominatimResponse) -> ReverseGeocode {
    let address = data.address.unwrap_or_default();
    let region = address.county.or(address.state);
    ReverseGeocode {
        region,
        subregion: address.state_district,
    }
}

#[axum::async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn resolve(&self, coordinates: GpsCoordinates) -> AppResult<ReverseGeocode> {
        let url = format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}",
            self.endpoint, coordinates.latitude, coordinates.longitude
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| request_error("Reverse geocoding", e))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Reverse geocoding error: {}",
                response.status()
            )));
        }

        let data: NominatimResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse reverse geocoding response: {}", e))
        })?;

        Ok(to_reverse_geocode(data))
    }
}

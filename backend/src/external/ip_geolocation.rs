//! IP geolocation client (ipapi.co style `/{ip}/json` endpoint)

use std::net::IpAddr;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::GpsCoordinates;

use super::{http_client, request_error};
use crate::error::{AppError, AppResult};
use crate::services::location::IpGeolocator;

#[derive(Clone)]
pub struct IpApiClient {
    client: Client,
    endpoint: String,
    ip: Option<IpAddr>,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpApiClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            ip: None,
        })
    }

    /// Same client, locating a specific caller address
    pub fn for_ip(&self, ip: IpAddr) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            ip: Some(ip),
        }
    }

    fn url(&self) -> String {
        match &self.ip {
            Some(ip) => format!("{}/{}/json", self.endpoint, ip),
            None => format!("{}/json", self.endpoint),
        }
    }
}

fn to_coordinates(data: IpApiResponse) -> AppResult<GpsCoordinates> {
    if data.error {
        return Err(AppError::ExternalService(format!(
            "IP geolocation error: {}",
            data.reason.unwrap_or_default()
        )));
    }
    let (Some(lat), Some(lon)) = (data.latitude, data.longitude) else {
        return Err(AppError::ExternalService(
            "IP geolocation returned no coordinates".to_string(),
        ));
    };
    let latitude = Decimal::from_f64_retain(lat)
        .ok_or_else(|| AppError::InvalidCoordinates(lat.to_string()))?
        .round_dp(6);
    let longitude = Decimal::from_f64_retain(lon)
        .ok_or_else(|| AppError::InvalidCoordinates(lon.to_string()))?
        .round_dp(6);
    Ok(GpsCoordinates::try_new(latitude, longitude)?)
}

#[axum::async_trait]
impl IpGeolocator for IpApiClient {
    async fn locate(&self) -> AppResult<GpsCoordinates> {
        let response = self
            .client
            .get(self.url())
            .send()
            .await
            .map_err(|e| request_error("IP geolocation", e))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "IP geolocation error: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse IP geolocation response: {}", e))
        })?;

        to_coordinates(data)
    }
}

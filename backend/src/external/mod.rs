//! External API integrations

use std::time::Duration;

use reqwest::Client;

use crate::error::{AppError, AppResult};

pub mod ip_geolocation;
pub mod reverse_geocoding;
pub mod weather;

pub use ip_geolocation::IpApiClient;
pub use reverse_geocoding::NominatimClient;
pub use weather::OpenWeatherMapClient;

/// HTTP client whose requests give up after `timeout`
pub(crate) fn http_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Classify a failed request, keeping timeouts distinct
pub(crate) fn request_error(service: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(service.to_string())
    } else {
        AppError::ExternalService(format!("{} request failed: {}", service, e))
    }
}

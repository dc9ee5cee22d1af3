//! Configuration management for the TreeMatch backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with TREEMATCH_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{DEFAULT_MIN_SCORE, MIN_SCORE_RANGE};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// IP geolocation and reverse geocoding
    pub geolocation: GeolocationConfig,

    /// Location acquisition policy
    pub location: LocationConfig,

    /// Ranking and catalog settings
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; the behavior ledger stays in memory without one
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key; weather is treated as unavailable when empty
    pub api_key: String,

    /// Per-request timeout for the weather API
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeolocationConfig {
    /// IP geolocation endpoint
    pub ip_endpoint: String,

    /// Reverse geocoding endpoint
    pub reverse_geocode_endpoint: String,

    /// User agent sent to the reverse geocoder
    pub user_agent: String,

    /// Per-request timeout for IP geolocation and reverse geocoding
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    /// Cached locations older than this are discarded
    pub cache_ttl_hours: i64,

    /// Upper bound on waiting for a GPS fix
    pub gps_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    /// Species scoring below this are not recommended
    pub min_score: u8,

    /// Species catalog (CSV or JSON)
    pub catalog_path: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("TREEMATCH_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.api_key", "")?
            .set_default("weather.request_timeout_secs", 10)?
            .set_default("geolocation.ip_endpoint", "https://ipapi.co")?
            .set_default(
                "geolocation.reverse_geocode_endpoint",
                "https://nominatim.openstreetmap.org",
            )?
            .set_default("geolocation.user_agent", "treematch/0.1")?
            .set_default("geolocation.request_timeout_secs", 5)?
            .set_default("location.cache_ttl_hours", 24)?
            .set_default("location.gps_timeout_secs", 10)?
            .set_default("recommendation.min_score", DEFAULT_MIN_SCORE as i64)?
            .set_default("recommendation.catalog_path", "data/species.csv")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TREEMATCH_ prefix)
            .add_source(
                Environment::with_prefix("TREEMATCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings outside the supported ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !MIN_SCORE_RANGE.contains(&self.recommendation.min_score) {
            return Err(ConfigError::Message(format!(
                "recommendation.min_score must be within {}..={}, got {}",
                MIN_SCORE_RANGE.start(),
                MIN_SCORE_RANGE.end(),
                self.recommendation.min_score
            )));
        }
        if self.location.cache_ttl_hours <= 0 {
            return Err(ConfigError::Message(
                "location.cache_ttl_hours must be positive".to_string(),
            ));
        }
        if self.location.gps_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "location.gps_timeout_secs must be positive".to_string(),
            ));
        }
        if self.weather.request_timeout_secs == 0 || self.geolocation.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.request_timeout_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_secs(self.geolocation.request_timeout_secs)
    }

    /// Whether a weather API key was supplied
    pub fn weather_enabled(&self) -> bool {
        !self.weather.api_key.trim().is_empty()
    }

    /// Database URL, treating an empty string as absent
    pub fn database_url(&self) -> Option<&str> {
        self.database
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            cache_ttl_hours: 24,
            gps_timeout_secs: 10,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: String::new(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            ip_endpoint: "https://ipapi.co".to_string(),
            reverse_geocode_endpoint: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "treematch/0.1".to_string(),
            request_timeout_secs: 5,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            catalog_path: "data/species.csv".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            weather: WeatherConfig::default(),
            geolocation: GeolocationConfig::default(),
            location: LocationConfig::default(),
            recommendation: RecommendationConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(!config.weather_enabled());
        assert!(config.database_url().is_none());
    }

    #[test]
    fn min_score_outside_range_is_rejected() {
        let mut config = Config::default();
        config.recommendation.min_score = 61;
        assert!(config.validate().is_err());
        config.recommendation.min_score = 49;
        assert!(config.validate().is_err());
        config.recommendation.min_score = 55;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_database_url_is_absent() {
        let mut config = Config::default();
        config.database.url = Some("   ".to_string());
        assert!(config.database_url().is_none());
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        let mut config = Config::default();
        config.geolocation.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.weather.request_timeout_secs = 0;
        assert!(config.validate().is_err());
        assert_eq!(Config::default().weather_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let mut config = Config::default();
        config.location.cache_ttl_hours = 0;
        assert!(config.validate().is_err());
    }
}

//! Location models

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::WeatherSnapshot;
use crate::types::GpsCoordinates;

/// How a location sample was obtained
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Gps,
    Ip,
    Manual,
    Cached,
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationSource::Gps => write!(f, "gps"),
            LocationSource::Ip => write!(f, "ip"),
            LocationSource::Manual => write!(f, "manual"),
            LocationSource::Cached => write!(f, "cached"),
        }
    }
}

/// A single resolved position
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationSample {
    pub coordinates: GpsCoordinates,
    pub accuracy_meters: u32,
    pub source: LocationSource,
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(
        coordinates: GpsCoordinates,
        accuracy_meters: u32,
        source: LocationSource,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            coordinates,
            accuracy_meters,
            source,
            captured_at,
        }
    }

    pub fn latitude(&self) -> Decimal {
        self.coordinates.latitude
    }

    pub fn longitude(&self) -> Decimal {
        self.coordinates.longitude
    }

    /// The same sample as reported when served from the cache
    pub fn as_cached(&self) -> Self {
        Self {
            source: LocationSource::Cached,
            ..self.clone()
        }
    }
}

/// Cache entry holding the last resolved location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedLocation {
    pub sample: LocationSample,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,
    pub cached_at: DateTime<Utc>,
}

impl CachedLocation {
    pub fn new(sample: LocationSample, cached_at: DateTime<Utc>) -> Self {
        Self {
            sample,
            weather: None,
            cached_at,
        }
    }

    pub fn with_weather(mut self, weather: WeatherSnapshot) -> Self {
        self.weather = Some(weather);
        self
    }

    /// An entry older than `ttl` is treated as absent
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.cached_at) > ttl
    }
}

/// Administrative region and agro-ecological zone for a position.
///
/// Either field may be absent when resolution fails; scoring degrades to
/// partial credit instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZoneInfo {
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    pub agro_zone: Option<String>,
}

impl ZoneInfo {
    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.region.is_some() && self.agro_zone.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(at: DateTime<Utc>) -> LocationSample {
        LocationSample::new(
            GpsCoordinates::new(Decimal::new(-4202, 4), Decimal::new(369483, 4)),
            12,
            LocationSource::Gps,
            at,
        )
    }

    #[test]
    fn test_cache_entry_fresh_within_ttl() {
        let now = Utc::now();
        let entry = CachedLocation::new(sample(now), now - Duration::hours(23));
        assert!(!entry.is_expired(now, Duration::hours(24)));
    }

    #[test]
    fn test_cache_entry_expired_after_ttl() {
        let now = Utc::now();
        let entry = CachedLocation::new(sample(now), now - Duration::hours(25));
        assert!(entry.is_expired(now, Duration::hours(24)));
    }

    #[test]
    fn test_as_cached_keeps_capture_time() {
        let now = Utc::now();
        let original = sample(now);
        let cached = original.as_cached();
        assert_eq!(cached.source, LocationSource::Cached);
        assert_eq!(cached.captured_at, original.captured_at);
        assert_eq!(cached.coordinates, original.coordinates);
    }
}

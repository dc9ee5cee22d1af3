//! Location acquisition with a cache → GPS → IP fallback chain

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{CachedLocation, GpsCoordinates, LocationSample, LocationSource, WeatherSnapshot};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// Accuracy reported for IP-derived positions
pub const IP_ACCURACY_METERS: u32 = 5000;

/// A raw fix from a device GPS
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsFix {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub accuracy_meters: u32,
}

/// Why a GPS request failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GpsError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("GPS request timed out")]
    Timeout,

    #[error("GPS unavailable: {0}")]
    Unavailable(String),
}

/// Device GPS provider
#[axum::async_trait]
pub trait GpsProvider: Send + Sync {
    /// Request a fresh fix; implementations must not reuse a cached position
    async fn current_position(
        &self,
        timeout: Duration,
        high_accuracy: bool,
    ) -> Result<GpsFix, GpsError>;
}

/// IP geolocation collaborator (coarse, best effort)
#[axum::async_trait]
pub trait IpGeolocator: Send + Sync {
    async fn locate(&self) -> AppResult<GpsCoordinates>;
}

/// Key-value store behind the location cache
#[axum::async_trait]
pub trait LocationCacheStore: Send + Sync {
    async fn load(&self, key: &str) -> AppResult<Option<CachedLocation>>;
    async fn store(&self, key: &str, entry: CachedLocation) -> AppResult<()>;
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// GPS provider backed by a fix the client already reported.
///
/// The browser performs the actual device query; no fix means the user
/// declined or the device had none.
pub struct ReportedGps {
    fix: Option<GpsFix>,
}

impl ReportedGps {
    pub fn new(fix: Option<GpsFix>) -> Self {
        Self { fix }
    }
}

#[axum::async_trait]
impl GpsProvider for ReportedGps {
    async fn current_position(
        &self,
        _timeout: Duration,
        _high_accuracy: bool,
    ) -> Result<GpsFix, GpsError> {
        self.fix.ok_or(GpsError::PermissionDenied)
    }
}

/// In-memory cache store, partitioned by session key
#[derive(Default)]
pub struct InMemoryLocationCacheStore {
    entries: RwLock<HashMap<String, CachedLocation>>,
}

impl InMemoryLocationCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[axum::async_trait]
impl LocationCacheStore for InMemoryLocationCacheStore {
    async fn load(&self, key: &str) -> AppResult<Option<CachedLocation>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, entry: CachedLocation) -> AppResult<()> {
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Time-boxed cache of the last resolved location.
///
/// Writes are last-write-wins; an entry older than the TTL is never returned.
#[derive(Clone)]
pub struct LocationCache {
    store: Arc<dyn LocationCacheStore>,
    ttl: chrono::Duration,
}

impl LocationCache {
    pub fn new(store: Arc<dyn LocationCacheStore>, ttl: chrono::Duration) -> Self {
        Self { store, ttl }
    }

    pub fn in_memory(ttl: chrono::Duration) -> Self {
        Self::new(Arc::new(InMemoryLocationCacheStore::new()), ttl)
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Fresh entry for `key`, if any. Expired entries are evicted.
    pub async fn get(&self, key: &str, now: DateTime<Utc>) -> Option<CachedLocation> {
        let entry = match self.store.load(key).await {
            Ok(entry) => entry?,
            Err(e) => {
                tracing::warn!("Location cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if entry.is_expired(now, self.ttl) {
            tracing::debug!("Location cache entry for {} expired", key);
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!("Failed to evict expired location for {}: {}", key, e);
            }
            return None;
        }

        Some(entry)
    }

    /// Overwrite the entry for `key`
    pub async fn put(&self, key: &str, sample: &LocationSample, now: DateTime<Utc>) {
        let entry = CachedLocation::new(sample.clone(), now);
        if let Err(e) = self.store.store(key, entry).await {
            tracing::warn!("Location cache write failed for {}: {}", key, e);
        }
    }

    /// Attach a weather snapshot to a still-fresh entry
    pub async fn attach_weather(&self, key: &str, weather: WeatherSnapshot, now: DateTime<Utc>) {
        if let Some(entry) = self.get(key, now).await {
            if let Err(e) = self.store.store(key, entry.with_weather(weather)).await {
                tracing::warn!("Failed to attach weather to cached location {}: {}", key, e);
            }
        }
    }
}

/// Resolves the user's position: cache, then GPS, then IP.
///
/// No automatic retries; a new call re-enters the chain from the cache.
pub struct LocationAcquirer {
    cache: LocationCache,
    gps: Arc<dyn GpsProvider>,
    ip: Arc<dyn IpGeolocator>,
    gps_timeout: Duration,
}

impl LocationAcquirer {
    pub fn new(
        cache: LocationCache,
        gps: Arc<dyn GpsProvider>,
        ip: Arc<dyn IpGeolocator>,
        gps_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            gps,
            ip,
            gps_timeout,
        }
    }

    /// Acquire a location for the cache partition `key`
    pub async fn acquire_location(&self, key: &str) -> AppResult<LocationSample> {
        self.acquire_location_at(key, Utc::now()).await
    }

    /// Acquire a location as of `now`
    pub async fn acquire_location_at(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> AppResult<LocationSample> {
        if let Some(entry) = self.cache.get(key, now).await {
            tracing::debug!("Using cached location for {}", key);
            return Ok(entry.sample.as_cached());
        }

        match self.try_gps(now).await {
            Ok(sample) => {
                tracing::info!("Location for {} resolved by GPS", key);
                self.cache.put(key, &sample, now).await;
                return Ok(sample);
            }
            Err(e) => tracing::warn!("GPS location failed for {}: {}", key, e),
        }

        match self.ip.locate().await {
            Ok(coordinates) => match coordinates.validated() {
                Ok(coordinates) => {
                    let sample =
                        LocationSample::new(coordinates, IP_ACCURACY_METERS, LocationSource::Ip, now);
                    tracing::info!("Location for {} resolved by IP geolocation", key);
                    self.cache.put(key, &sample, now).await;
                    return Ok(sample);
                }
                Err(e) => tracing::warn!("IP geolocation returned invalid coordinates: {}", e),
            },
            Err(e) => tracing::warn!("IP geolocation failed for {}: {}", key, e),
        }

        Err(AppError::LocationUnavailable)
    }

    async fn try_gps(&self, now: DateTime<Utc>) -> Result<LocationSample, GpsError> {
        let fix = tokio::time::timeout(
            self.gps_timeout,
            self.gps.current_position(self.gps_timeout, true),
        )
        .await
        .map_err(|_| GpsError::Timeout)??;

        let coordinates = GpsCoordinates::try_new(fix.latitude, fix.longitude)
            .map_err(|e| GpsError::Unavailable(e.to_string()))?;

        Ok(LocationSample::new(
            coordinates,
            fix.accuracy_meters,
            LocationSource::Gps,
            now,
        ))
    }
}

/// Build a manually entered sample, validating the coordinates
pub fn manual_location(
    latitude: Decimal,
    longitude: Decimal,
    now: DateTime<Utc>,
) -> AppResult<LocationSample> {
    let coordinates = GpsCoordinates::try_new(latitude, longitude)?;
    Ok(LocationSample::new(
        coordinates,
        0,
        LocationSource::Manual,
        now,
    ))
}

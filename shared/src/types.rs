//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{validate_latitude, validate_longitude};

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates, rejecting values outside ±90 / ±180
    pub fn try_new(latitude: Decimal, longitude: Decimal) -> Result<Self, EngineError> {
        validate_latitude(latitude).map_err(|_| EngineError::InvalidLatitude(latitude))?;
        validate_longitude(longitude).map_err(|_| EngineError::InvalidLongitude(longitude))?;
        Ok(Self::new(latitude, longitude))
    }

    /// Re-check coordinates that arrived through deserialization
    pub fn validated(self) -> Result<Self, EngineError> {
        Self::try_new(self.latitude, self.longitude)
    }

    /// Approximate ground distance in kilometres (equirectangular projection).
    ///
    /// Good enough for the short distances used when snapping a point to the
    /// nearest region centroid.
    pub fn approx_distance_km(&self, other: &GpsCoordinates) -> f64 {
        let lat1 = decimal_to_f64(self.latitude).to_radians();
        let lat2 = decimal_to_f64(other.latitude).to_radians();
        let dlat = lat2 - lat1;
        let dlon = (decimal_to_f64(other.longitude) - decimal_to_f64(self.longitude)).to_radians();
        let x = dlon * ((lat1 + lat2) / 2.0).cos();
        (x * x + dlat * dlat).sqrt() * 6371.0
    }
}

/// Errors raised at the engine's input boundary
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    #[error("Latitude {0} is outside the range -90..=90")]
    InvalidLatitude(Decimal),

    #[error("Longitude {0} is outside the range -180..=180")]
    InvalidLongitude(Decimal),

    #[error("Minimum score {0} is outside the range 0..=100")]
    InvalidMinScore(u8),
}

pub(crate) fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}

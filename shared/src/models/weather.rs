//! Weather models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Live conditions used by the scoring engine.
///
/// Fetched per scoring call and never persisted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub estimated_annual_rainfall_mm: Decimal,
}

impl WeatherSnapshot {
    pub fn new(
        temperature_celsius: Decimal,
        humidity_percent: i32,
        estimated_annual_rainfall_mm: Decimal,
    ) -> Self {
        Self {
            temperature_celsius,
            humidity_percent,
            estimated_annual_rainfall_mm,
        }
    }
}

//! Live-weather fit for a species
//!
//! Three sub-checks (temperature, humidity, rainfall) each give full, partial
//! or no credit depending on how far the live value sits from the species'
//! ideal range. Ranges are derived from the species' declared climates, soils
//! and zones.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::compatibility::zone_band;
use crate::models::{TreeSpecies, WeatherSnapshot};

/// Credit for one sub-check
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FitCredit {
    Full,
    Partial,
    None,
}

impl FitCredit {
    /// Credit as a percentage
    pub fn percent(&self) -> u32 {
        match self {
            FitCredit::Full => 100,
            FitCredit::Partial => 50,
            FitCredit::None => 0,
        }
    }
}

/// Inclusive ideal range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdealRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl IdealRange {
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    fn from_ints(min: i64, max: i64) -> Self {
        Self::new(Decimal::from(min), Decimal::from(max))
    }

    /// Smallest range covering both
    fn union(self, other: IdealRange) -> IdealRange {
        IdealRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Full credit inside the range, partial within `tolerance` of an edge
    pub fn assess(&self, value: Decimal, tolerance: Decimal) -> FitCredit {
        if value >= self.min && value <= self.max {
            FitCredit::Full
        } else if value >= self.min - tolerance && value <= self.max + tolerance {
            FitCredit::Partial
        } else {
            FitCredit::None
        }
    }
}

/// Breakdown of the three sub-checks
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WeatherFit {
    pub temperature: FitCredit,
    pub humidity: FitCredit,
    pub rainfall: FitCredit,
}

impl WeatherFit {
    /// Average of the three sub-checks, 0-100
    pub fn percent(&self) -> u32 {
        let total = self.temperature.percent() + self.humidity.percent() + self.rainfall.percent();
        (total + 1) / 3
    }
}

const TEMPERATURE_TOLERANCE_C: i64 = 5;
const HUMIDITY_TOLERANCE_PERCENT: i64 = 10;
const RAINFALL_TOLERANCE_MM: i64 = 200;

fn climate_temperature_range(climate: &str) -> Option<IdealRange> {
    let range = match climate.trim().to_ascii_lowercase().as_str() {
        "tropical" => IdealRange::from_ints(20, 32),
        "subtropical" => IdealRange::from_ints(15, 28),
        "temperate" => IdealRange::from_ints(10, 24),
        "highland" | "montane" => IdealRange::from_ints(12, 24),
        "semi-arid" | "semi_arid" => IdealRange::from_ints(20, 34),
        "arid" => IdealRange::from_ints(22, 38),
        "humid" => IdealRange::from_ints(22, 32),
        _ => return None,
    };
    Some(range)
}

fn soil_humidity_range(soil: &str) -> Option<IdealRange> {
    let range = match soil.trim().to_ascii_lowercase().as_str() {
        "clay" => IdealRange::from_ints(60, 90),
        "loam" | "silt" => IdealRange::from_ints(50, 80),
        "sandy" | "sandy loam" => IdealRange::from_ints(30, 60),
        "volcanic" => IdealRange::from_ints(55, 85),
        "laterite" | "red soil" => IdealRange::from_ints(40, 70),
        "black cotton" => IdealRange::from_ints(50, 80),
        _ => return None,
    };
    Some(range)
}

fn zone_rainfall_range(zone: &str) -> Option<IdealRange> {
    let range = match zone_band(zone)?.as_str() {
        "UH" => IdealRange::from_ints(1200, 2400),
        "LH" => IdealRange::from_ints(900, 1800),
        "UM" => IdealRange::from_ints(900, 1800),
        "LM" => IdealRange::from_ints(600, 1200),
        "IL" => IdealRange::from_ints(300, 800),
        "CL" => IdealRange::from_ints(800, 1400),
        _ => return None,
    };
    Some(range)
}

fn combined_range<'a>(
    tags: impl Iterator<Item = &'a String>,
    lookup: fn(&str) -> Option<IdealRange>,
    default: IdealRange,
) -> IdealRange {
    tags.filter_map(|tag| lookup(tag))
        .reduce(IdealRange::union)
        .unwrap_or(default)
}

/// Ideal temperature range from the species' climates
pub fn temperature_range(tree: &TreeSpecies) -> IdealRange {
    combined_range(
        tree.suitable_climates.iter(),
        climate_temperature_range,
        IdealRange::from_ints(15, 30),
    )
}

/// Ideal humidity range from the species' preferred soils
pub fn humidity_range(tree: &TreeSpecies) -> IdealRange {
    combined_range(
        tree.preferred_soils.iter(),
        soil_humidity_range,
        IdealRange::from_ints(40, 80),
    )
}

/// Ideal annual rainfall range from the species' suitable zones
pub fn rainfall_range(tree: &TreeSpecies) -> IdealRange {
    combined_range(
        tree.suitable_zones.iter(),
        zone_rainfall_range,
        IdealRange::from_ints(600, 1800),
    )
}

/// Run the three sub-checks for a species against live weather
pub fn assess_weather_fit(tree: &TreeSpecies, weather: &WeatherSnapshot) -> WeatherFit {
    WeatherFit {
        temperature: temperature_range(tree).assess(
            weather.temperature_celsius,
            Decimal::from(TEMPERATURE_TOLERANCE_C),
        ),
        humidity: humidity_range(tree).assess(
            Decimal::from(weather.humidity_percent),
            Decimal::from(HUMIDITY_TOLERANCE_PERCENT),
        ),
        rainfall: rainfall_range(tree).assess(
            weather.estimated_annual_rainfall_mm,
            Decimal::from(RAINFALL_TOLERANCE_MM),
        ),
    }
}

//! Tree species reference data

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tree species from the catalog.
///
/// Read-only reference data; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeSpecies {
    pub id: String,
    pub common_name: String,
    pub scientific_name: String,
    pub local_name: Option<String>,
    #[serde(default)]
    pub suitable_regions: BTreeSet<String>,
    #[serde(default)]
    pub suitable_zones: BTreeSet<String>,
    #[serde(default)]
    pub preferred_soils: BTreeSet<String>,
    #[serde(default)]
    pub suitable_climates: BTreeSet<String>,
    /// Declared uses and benefits (timber, shade, fruit, soil_conservation, ...)
    #[serde(default)]
    pub uses: BTreeSet<String>,
    pub unit_price: Decimal,
    pub growth_rate: GrowthRate,
    /// Minimum land size in acres
    pub min_land_size_acres: Decimal,
}

impl TreeSpecies {
    pub fn display_name(&self) -> &str {
        &self.common_name
    }
}

/// Growth rate tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GrowthRate {
    Slow,
    Medium,
    Fast,
}

impl std::fmt::Display for GrowthRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrowthRate::Slow => write!(f, "slow"),
            GrowthRate::Medium => write!(f, "medium"),
            GrowthRate::Fast => write!(f, "fast"),
        }
    }
}

impl std::str::FromStr for GrowthRate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(GrowthRate::Slow),
            "medium" | "moderate" => Ok(GrowthRate::Medium),
            "fast" => Ok(GrowthRate::Fast),
            other => Err(format!("Unknown growth rate: {}", other)),
        }
    }
}

/// Case-insensitive membership test used for region, zone, soil and use tags
pub fn contains_ignore_case(set: &BTreeSet<String>, value: &str) -> bool {
    let value = value.trim();
    set.iter().any(|item| item.trim().eq_ignore_ascii_case(value))
}

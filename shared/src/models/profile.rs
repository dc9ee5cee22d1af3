//! Land steward profile

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ZoneInfo;
use crate::types::GpsCoordinates;

/// What a land steward tells us about their land and goals
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub region: Option<String>,
    pub agro_zone: Option<String>,
    pub soil_type: Option<String>,
    pub climate_zone: Option<String>,
    /// Land size in acres
    pub land_size_acres: Option<Decimal>,
    #[serde(default)]
    pub conservation_goals: BTreeSet<String>,
    pub location: Option<GpsCoordinates>,
}

impl UserProfile {
    /// Stated region, ignoring blank strings
    pub fn stated_region(&self) -> Option<&str> {
        non_blank(self.region.as_deref())
    }

    /// Stated agro-ecological zone, ignoring blank strings
    pub fn stated_zone(&self) -> Option<&str> {
        non_blank(self.agro_zone.as_deref())
    }

    /// Stated goals, ignoring blank entries
    pub fn stated_goals(&self) -> impl Iterator<Item = &str> {
        self.conservation_goals
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
    }

    /// Fill region and zone from a resolver result without overwriting
    /// anything the steward stated explicitly.
    pub fn with_zone_info(mut self, info: &ZoneInfo) -> Self {
        if self.stated_region().is_none() {
            self.region = info.region.clone();
        }
        if self.stated_zone().is_none() {
            self.agro_zone = info.agro_zone.clone();
        }
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

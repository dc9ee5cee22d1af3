//! Region and agro-ecological zone resolution

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::{normalize_region_name, GpsCoordinates, ZoneInfo};

use crate::error::AppResult;

/// Positions further than this from every known centroid stay unresolved
pub const MAX_CENTROID_DISTANCE_KM: f64 = 75.0;

/// Result of a reverse-geocoding lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseGeocode {
    pub region: Option<String>,
    pub subregion: Option<String>,
}

/// Reverse-geocoding collaborator
#[axum::async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn resolve(&self, coordinates: GpsCoordinates) -> AppResult<ReverseGeocode>;
}

/// A known administrative region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEntry {
    pub name: String,
    pub centroid: GpsCoordinates,
    pub agro_zone: String,
}

impl RegionEntry {
    fn new(name: &str, lat_e2: i64, lon_e2: i64, agro_zone: &str) -> Self {
        Self {
            name: name.to_string(),
            centroid: GpsCoordinates::new(Decimal::new(lat_e2, 2), Decimal::new(lon_e2, 2)),
            agro_zone: agro_zone.to_string(),
        }
    }
}

/// Static directory of regions with their dominant zone
#[derive(Debug, Clone)]
pub struct RegionDirectory {
    entries: Vec<RegionEntry>,
}

impl RegionDirectory {
    pub fn new(entries: Vec<RegionEntry>) -> Self {
        Self { entries }
    }

    /// Kenyan counties with approximate centroids
    pub fn kenya() -> Self {
        Self::new(vec![
            RegionEntry::new("Nairobi", -129, 3682, "UM4"),
            RegionEntry::new("Kiambu", -103, 3683, "UM2"),
            RegionEntry::new("Nyeri", -42, 3695, "UH1"),
            RegionEntry::new("Murang'a", -72, 3715, "UM2"),
            RegionEntry::new("Kirinyaga", -50, 3728, "UM1"),
            RegionEntry::new("Embu", -54, 3745, "UM3"),
            RegionEntry::new("Meru", 5, 3765, "UM2"),
            RegionEntry::new("Nyandarua", -18, 3652, "UH2"),
            RegionEntry::new("Nakuru", -30, 3607, "LH3"),
            RegionEntry::new("Kericho", -37, 3528, "LH1"),
            RegionEntry::new("Uasin Gishu", 52, 3527, "LH3"),
            RegionEntry::new("Elgeyo-Marakwet", 80, 3550, "LH2"),
            RegionEntry::new("Kakamega", 28, 3475, "LM1"),
            RegionEntry::new("Kisumu", -9, 3477, "LM3"),
            RegionEntry::new("Machakos", -152, 3726, "LM4"),
            RegionEntry::new("Makueni", -180, 3762, "LM5"),
            RegionEntry::new("Kitui", -137, 3801, "LM5"),
            RegionEntry::new("Taita Taveta", -340, 3855, "LM5"),
            RegionEntry::new("Mombasa", -404, 3967, "CL3"),
            RegionEntry::new("Kwale", -417, 3945, "CL3"),
            RegionEntry::new("Kilifi", -363, 3985, "CL4"),
            RegionEntry::new("Garissa", -45, 3965, "IL6"),
            RegionEntry::new("Marsabit", 233, 3799, "IL6"),
            RegionEntry::new("Turkana", 312, 3560, "IL6"),
        ])
    }

    /// Look a region up by name (case-insensitive, "County" suffix ignored)
    pub fn lookup(&self, name: &str) -> Option<&RegionEntry> {
        let wanted = normalize_region_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| normalize_region_name(&entry.name) == wanted)
    }

    /// Nearest centroid within `max_km`
    pub fn nearest(&self, coordinates: &GpsCoordinates, max_km: f64) -> Option<&RegionEntry> {
        self.entries
            .iter()
            .map(|entry| (entry, entry.centroid.approx_distance_km(coordinates)))
            .filter(|(_, km)| *km <= max_km)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(entry, _)| entry)
    }
}

/// Maps coordinates or a stated region to region + agro-ecological zone.
///
/// Partial results are normal: either field may come back empty.
pub struct ZoneResolver {
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    directory: RegionDirectory,
}

impl ZoneResolver {
    pub fn new(geocoder: Option<Arc<dyn ReverseGeocoder>>, directory: RegionDirectory) -> Self {
        Self {
            geocoder,
            directory,
        }
    }

    pub fn directory(&self) -> &RegionDirectory {
        &self.directory
    }

    /// Resolve a manually chosen region name
    pub fn resolve_region(&self, region: &str) -> ZoneInfo {
        match self.directory.lookup(region) {
            Some(entry) => ZoneInfo {
                region: Some(entry.name.clone()),
                subregion: None,
                agro_zone: Some(entry.agro_zone.clone()),
            },
            None => {
                let region = region.trim();
                ZoneInfo {
                    region: (!region.is_empty()).then(|| region.to_string()),
                    subregion: None,
                    agro_zone: None,
                }
            }
        }
    }

    /// Resolve coordinates. Fails only on out-of-range coordinates.
    pub async fn resolve_zone(&self, coordinates: GpsCoordinates) -> AppResult<ZoneInfo> {
        let coordinates = coordinates.validated()?;

        let geocoded = match &self.geocoder {
            Some(geocoder) => match geocoder.resolve(coordinates).await {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("Reverse geocoding failed: {}", e);
                    None
                }
            },
            None => None,
        };

        let nearest = self
            .directory
            .nearest(&coordinates, MAX_CENTROID_DISTANCE_KM);

        let info = match geocoded {
            Some(ReverseGeocode { region: Some(region), subregion }) => {
                let known = self
                    .directory
                    .lookup(&region)
                    .or_else(|| subregion.as_deref().and_then(|s| self.directory.lookup(s)));
                match known {
                    Some(entry) => ZoneInfo {
                        region: Some(entry.name.clone()),
                        subregion,
                        agro_zone: Some(entry.agro_zone.clone()),
                    },
                    None => ZoneInfo {
                        region: Some(region),
                        subregion,
                        agro_zone: nearest.map(|entry| entry.agro_zone.clone()),
                    },
                }
            }
            _ => match nearest {
                Some(entry) => ZoneInfo {
                    region: Some(entry.name.clone()),
                    subregion: None,
                    agro_zone: Some(entry.agro_zone.clone()),
                },
                None => ZoneInfo::unresolved(),
            },
        };

        if !info.is_resolved() {
            tracing::debug!(
                "Zone unresolved for ({}, {}): region={:?} zone={:?}",
                coordinates.latitude,
                coordinates.longitude,
                info.region,
                info.agro_zone
            );
        }

        Ok(info)
    }
}

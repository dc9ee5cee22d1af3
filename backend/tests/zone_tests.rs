//! Zone resolution tests
//!
//! Reverse geocoding first, then the region directory, then the nearest
//! known centroid. Unresolved zones are a normal outcome, not an error.

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::GpsCoordinates;
use treematch_backend::services::{RegionDirectory, ReverseGeocode, ReverseGeocoder, ZoneResolver};
use treematch_backend::{AppError, AppResult};

struct FixedGeocoder(Option<ReverseGeocode>);

#[axum::async_trait]
impl ReverseGeocoder for FixedGeocoder {
    async fn resolve(&self, _coordinates: GpsCoordinates) -> AppResult<ReverseGeocode> {
        self.0
            .clone()
            .ok_or_else(|| AppError::ExternalService("geocoder down".to_string()))
    }
}

fn resolver(geocode: Option<ReverseGeocode>) -> ZoneResolver {
    ZoneResolver::new(
        Some(Arc::new(FixedGeocoder(geocode))),
        RegionDirectory::kenya(),
    )
}

fn nyeri() -> GpsCoordinates {
    GpsCoordinates::new(Decimal::new(-42, 2), Decimal::new(3695, 2))
}

#[tokio::test]
async fn geocoded_county_maps_to_zone() {
    let zones = resolver(Some(ReverseGeocode {
        region: Some("Nyeri County".to_string()),
        subregion: Some("Mathira".to_string()),
    }));

    let info = zones.resolve_zone(nyeri()).await.unwrap();
    assert_eq!(info.region.as_deref(), Some("Nyeri"));
    assert_eq!(info.subregion.as_deref(), Some("Mathira"));
    assert_eq!(info.agro_zone.as_deref(), Some("UH1"));
    assert!(info.is_resolved());
}

#[tokio::test]
async fn geocoder_failure_uses_nearest_centroid() {
    let zones = resolver(None);

    let info = zones.resolve_zone(nyeri()).await.unwrap();
    assert_eq!(info.region.as_deref(), Some("Nyeri"));
    assert_eq!(info.agro_zone.as_deref(), Some("UH1"));
}

#[tokio::test]
async fn unknown_geocoded_region_keeps_name_and_borrows_nearby_zone() {
    let zones = resolver(Some(ReverseGeocode {
        region: Some("Central Highlands".to_string()),
        subregion: None,
    }));

    let info = zones.resolve_zone(nyeri()).await.unwrap();
    assert_eq!(info.region.as_deref(), Some("Central Highlands"));
    assert_eq!(info.agro_zone.as_deref(), Some("UH1"));
}

#[tokio::test]
async fn remote_position_is_unresolved_not_an_error() {
    let zones = ZoneResolver::new(None, RegionDirectory::kenya());

    // Indian Ocean, far from every centroid
    let ocean = GpsCoordinates::new(Decimal::ZERO, Decimal::from(60));
    let info = zones.resolve_zone(ocean).await.unwrap();

    assert!(info.region.is_none());
    assert!(info.agro_zone.is_none());
    assert!(!info.is_resolved());
}

#[tokio::test]
async fn invalid_coordinates_are_rejected() {
    let zones = ZoneResolver::new(None, RegionDirectory::kenya());
    let bad = GpsCoordinates::new(Decimal::from(95), Decimal::ZERO);

    let result = zones.resolve_zone(bad).await;
    assert!(matches!(result, Err(AppError::InvalidCoordinates(_))));
}

#[test]
fn manual_region_lookup_ignores_case_and_suffix() {
    let zones = ZoneResolver::new(None, RegionDirectory::kenya());

    let info = zones.resolve_region("  kitui county ");
    assert_eq!(info.region.as_deref(), Some("Kitui"));
    assert_eq!(info.agro_zone.as_deref(), Some("LM5"));
}

#[test]
fn unknown_manual_region_has_no_zone() {
    let zones = ZoneResolver::new(None, RegionDirectory::kenya());

    let info = zones.resolve_region("Narnia");
    assert_eq!(info.region.as_deref(), Some("Narnia"));
    assert!(info.agro_zone.is_none());
}

#[test]
fn nearest_respects_distance_limit() {
    let directory = RegionDirectory::kenya();
    // Roughly 20 km east of the Nyeri centroid
    let nearby = GpsCoordinates::new(Decimal::new(-42, 2), Decimal::new(3713, 2));

    assert!(directory.nearest(&nearby, 75.0).is_some());
    assert!(directory.nearest(&nearby, 1.0).is_none());
}

//! Business logic services

pub mod behavior;
pub mod catalog;
pub mod location;
pub mod recommendation;
pub mod weather;
pub mod zone;

pub use behavior::{BehaviorLedger, BehaviorStore, InMemoryBehaviorStore, PgBehaviorStore};
pub use catalog::SpeciesCatalog;
pub use location::{
    manual_location, GpsError, GpsFix, GpsProvider, InMemoryLocationCacheStore, IpGeolocator,
    LocationAcquirer, LocationCache, LocationCacheStore, ReportedGps,
};
pub use recommendation::{Recommendation, RecommendationList, RecommendationService};
pub use weather::{fetch_optional, UnconfiguredWeather, WeatherGateway};
pub use zone::{RegionDirectory, ReverseGeocode, ReverseGeocoder, ZoneResolver};

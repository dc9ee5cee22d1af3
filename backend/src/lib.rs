//! TreeMatch backend
//!
//! Location acquisition, zone resolution, weather lookup and the behavior
//! ledger around the pure recommendation engine in `shared`.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind};

use external::{IpApiClient, NominatimClient, OpenWeatherMapClient};
use services::{
    BehaviorLedger, LocationCache, RecommendationService, RegionDirectory, ReverseGeocoder,
    SpeciesCatalog, UnconfiguredWeather, WeatherGateway, ZoneResolver,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Option<sqlx::PgPool>,
    pub catalog: Arc<SpeciesCatalog>,
    pub location_cache: LocationCache,
    pub ip_locator: IpApiClient,
    pub zones: Arc<ZoneResolver>,
    pub weather: Arc<dyn WeatherGateway>,
    pub ledger: BehaviorLedger,
}

impl AppState {
    /// Wire collaborators from configuration.
    ///
    /// Without a database the behavior ledger lives in memory; without a
    /// weather key scoring runs without weather.
    pub fn from_config(
        config: Config,
        catalog: SpeciesCatalog,
        db: Option<sqlx::PgPool>,
    ) -> AppResult<Self> {
        let weather: Arc<dyn WeatherGateway> = if config.weather_enabled() {
            Arc::new(OpenWeatherMapClient::with_base_url(
                config.weather.api_key.clone(),
                config.weather.api_endpoint.clone(),
                config.weather_timeout(),
            )?)
        } else {
            tracing::warn!("No weather API key configured; scoring without weather");
            Arc::new(UnconfiguredWeather)
        };

        let geocoder: Arc<dyn ReverseGeocoder> = Arc::new(NominatimClient::new(
            config.geolocation.reverse_geocode_endpoint.clone(),
            config.geolocation.user_agent.clone(),
            config.geolocation_timeout(),
        )?);

        let ledger = match &db {
            Some(pool) => {
                BehaviorLedger::new(Arc::new(services::PgBehaviorStore::new(pool.clone())))
            }
            None => {
                tracing::warn!("No database configured; behavior ledger is in memory");
                BehaviorLedger::in_memory()
            }
        };

        Ok(Self {
            location_cache: LocationCache::in_memory(chrono::Duration::hours(
                config.location.cache_ttl_hours,
            )),
            ip_locator: IpApiClient::new(
                config.geolocation.ip_endpoint.clone(),
                config.geolocation_timeout(),
            )?,
            zones: Arc::new(ZoneResolver::new(Some(geocoder), RegionDirectory::kenya())),
            catalog: Arc::new(catalog),
            config: Arc::new(config),
            db,
            weather,
            ledger,
        })
    }

    pub fn gps_timeout(&self) -> Duration {
        Duration::from_secs(self.config.location.gps_timeout_secs)
    }

    pub fn recommendations(&self) -> RecommendationService {
        RecommendationService::new(
            self.catalog.clone(),
            self.zones.clone(),
            self.weather.clone(),
            self.ledger.clone(),
        )
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "TreeMatch API v1"
}

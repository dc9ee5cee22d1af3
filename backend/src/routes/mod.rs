//! Route definitions for the TreeMatch API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/location", location_routes())
        .route("/zones/resolve", post(handlers::resolve_zone))
        .route("/recommendations", post(handlers::recommend))
        .nest("/species", species_routes())
        .nest("/behavior", behavior_routes())
}

fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/acquire", post(handlers::acquire_location))
        .route("/manual", post(handlers::set_manual_location))
}

fn species_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/season", post(handlers::species_season))
        .route("/:id/success", post(handlers::species_success))
}

fn behavior_routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(handlers::record_event))
        .route("/goals/:user_id", put(handlers::set_goals))
        .route("/likelihood", get(handlers::get_likelihood))
}

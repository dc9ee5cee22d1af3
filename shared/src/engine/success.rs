//! Success probability estimation
//!
//! Blends four independently computed 0-100 factors (location, zone, season
//! and weather) with fixed weights. Low factors are reported as risks.

use chrono::NaiveDate;

use crate::engine::compatibility::{region_points, zone_points};
use crate::engine::seasonal::{month_name, recommend_season};
use crate::engine::weather_fit::assess_weather_fit;
use crate::engine::weights::*;
use crate::models::{
    SeasonRating, SuccessFactors, SuccessProbability, SuccessRating, TreeSpecies, UserProfile,
    WeatherSnapshot,
};

/// Map a probability onto its rating tier
pub fn classify_probability(probability: u8) -> SuccessRating {
    match probability {
        p if p >= VERY_HIGH_THRESHOLD => SuccessRating::VeryHigh,
        p if p >= HIGH_THRESHOLD => SuccessRating::High,
        p if p >= MODERATE_THRESHOLD => SuccessRating::Moderate,
        _ => SuccessRating::Low,
    }
}

/// Weighted blend of the four factors, rounded to the nearest integer
pub fn combine_factors(factors: &SuccessFactors) -> u8 {
    let weighted = SUCCESS_LOCATION_WEIGHT * u32::from(factors.location)
        + SUCCESS_ZONE_WEIGHT * u32::from(factors.zone)
        + SUCCESS_SEASON_WEIGHT * u32::from(factors.season)
        + SUCCESS_WEATHER_WEIGHT * u32::from(factors.weather);
    ((weighted + 50) / 100).min(100) as u8
}

fn scale_to_percent(points: u32, weight: u32) -> u8 {
    ((points * 100 + weight / 2) / weight).min(100) as u8
}

fn season_factor(rating: SeasonRating) -> u8 {
    match rating {
        SeasonRating::Optimal => SEASON_FACTOR_OPTIMAL,
        SeasonRating::Acceptable => SEASON_FACTOR_ACCEPTABLE,
        SeasonRating::Poor => SEASON_FACTOR_POOR,
    }
}

fn join_or(items: impl Iterator<Item = String>, empty: &str) -> String {
    let joined: Vec<String> = items.collect();
    if joined.is_empty() {
        empty.to_string()
    } else {
        joined.join(", ")
    }
}

/// Compute the individual factors without blending
pub fn success_factors(
    tree: &TreeSpecies,
    profile: &UserProfile,
    weather: Option<&WeatherSnapshot>,
    today: NaiveDate,
) -> SuccessFactors {
    let season = recommend_season(tree, profile, today);
    SuccessFactors {
        location: scale_to_percent(region_points(tree, profile), REGION_WEIGHT),
        zone: scale_to_percent(zone_points(tree, profile), ZONE_WEIGHT),
        season: season_factor(season.current_season_rating),
        weather: weather
            .map(|w| assess_weather_fit(tree, w).percent() as u8)
            .unwrap_or(NEUTRAL_WEATHER_FACTOR),
    }
}

/// Estimate the probability that planting `tree` succeeds for `profile`
pub fn estimate_success(
    tree: &TreeSpecies,
    profile: &UserProfile,
    weather: Option<&WeatherSnapshot>,
    today: NaiveDate,
) -> SuccessProbability {
    let factors = success_factors(tree, profile, weather, today);
    let probability = combine_factors(&factors);

    let mut risk_factors = Vec::new();

    if factors.location < LOW_FACTOR_THRESHOLD {
        risk_factors.push(format!(
            "{} is best suited to: {}",
            tree.display_name(),
            join_or(tree.suitable_regions.iter().cloned(), "no listed regions")
        ));
    }

    if factors.zone < LOW_FACTOR_THRESHOLD {
        risk_factors.push(format!(
            "Preferred agro-ecological zones: {}",
            join_or(tree.suitable_zones.iter().cloned(), "none listed")
        ));
    }

    if factors.season < LOW_FACTOR_THRESHOLD {
        let season = recommend_season(tree, profile, today);
        risk_factors.push(format!(
            "Outside the planting season; best months: {}",
            join_or(
                season.optimal_months.iter().map(|m| month_name(*m).to_string()),
                "unknown"
            )
        ));
    }

    if factors.weather < LOW_FACTOR_THRESHOLD {
        risk_factors.push(
            "Current temperature, humidity or rainfall is outside this species' preferred range"
                .to_string(),
        );
    }

    SuccessProbability {
        probability,
        rating: classify_probability(probability),
        factors,
        risk_factors,
    }
}

//! Validation utilities for TreeMatch
//!
//! Coordinate checks run at the input boundary, before any scoring logic.

use rust_decimal::Decimal;

use crate::models::{UserProfile, WeatherSnapshot};

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Validate latitude is within -90..=90
pub fn validate_latitude(latitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    Ok(())
}

/// Validate longitude is within -180..=180
pub fn validate_longitude(longitude: Decimal) -> Result<(), &'static str> {
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

// ============================================================================
// Profile Validations
// ============================================================================

/// Validate agro-ecological zone code format.
///
/// Codes are a two-letter band (UH, LH, UM, LM, IL, CL, ...) followed by an
/// optional moisture digit, e.g. "UH1" or "LM4".
pub fn validate_zone_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if !code.is_ascii() {
        return Err("Zone code must be ASCII");
    }
    if code.len() < 2 || code.len() > 4 {
        return Err("Zone code must be 2-4 characters");
    }
    let (band, rest) = code.split_at(2);
    if !band.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("Zone code must start with a two-letter band");
    }
    if !rest.chars().all(|c| c.is_ascii_digit()) {
        return Err("Zone code suffix must be numeric");
    }
    Ok(())
}

/// Validate land size is positive when given
pub fn validate_land_size(acres: Decimal) -> Result<(), &'static str> {
    if acres <= Decimal::ZERO {
        return Err("Land size must be greater than zero");
    }
    Ok(())
}

/// Validate a whole profile before it reaches the engine
pub fn validate_profile(profile: &UserProfile) -> Result<(), &'static str> {
    if let Some(location) = &profile.location {
        validate_latitude(location.latitude)?;
        validate_longitude(location.longitude)?;
    }
    if let Some(zone) = profile.stated_zone() {
        validate_zone_code(zone)?;
    }
    if let Some(acres) = profile.land_size_acres {
        validate_land_size(acres)?;
    }
    Ok(())
}

// ============================================================================
// Weather Validations
// ============================================================================

/// Validate humidity is a percentage
pub fn validate_humidity(humidity_percent: i32) -> Result<(), &'static str> {
    if !(0..=100).contains(&humidity_percent) {
        return Err("Humidity must be between 0 and 100%");
    }
    Ok(())
}

/// Validate a weather snapshot
pub fn validate_weather(weather: &WeatherSnapshot) -> Result<(), &'static str> {
    validate_humidity(weather.humidity_percent)?;
    if weather.estimated_annual_rainfall_mm < Decimal::ZERO {
        return Err("Rainfall cannot be negative");
    }
    if weather.temperature_celsius < Decimal::from(-90)
        || weather.temperature_celsius > Decimal::from(60)
    {
        return Err("Temperature out of plausible range");
    }
    Ok(())
}

/// Normalize a region name for lookups: trims, drops a trailing
/// " County" and lowercases.
pub fn normalize_region_name(name: &str) -> String {
    let trimmed = name.trim();
    let lower = trimmed.to_lowercase();
    let without_suffix = lower
        .strip_suffix(" county")
        .unwrap_or(lower.as_str())
        .trim();
    without_suffix.to_string()
}

//! Derived recommendation results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Compatibility of one species with one profile.
///
/// Recomputed on every call; never cached across profile or weather changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompatibilityResult {
    /// Final score, 0-100
    pub score: u8,
    pub region_points: u32,
    pub zone_points: u32,
    pub goal_points: u32,
    pub weather_bonus: u32,
}

/// Planting season rating for the current month
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeasonRating {
    Optimal,
    Acceptable,
    Poor,
}

impl std::fmt::Display for SeasonRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeasonRating::Optimal => write!(f, "optimal"),
            SeasonRating::Acceptable => write!(f, "acceptable"),
            SeasonRating::Poor => write!(f, "poor"),
        }
    }
}

/// Seasonal planting advice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonalRecommendation {
    pub can_plant_now: bool,
    /// Window months (1-12), nearest window first
    pub optimal_months: Vec<u32>,
    pub current_season_rating: SeasonRating,
    pub next_optimal_date: NaiveDate,
    pub advice: String,
}

/// Success probability tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessRating {
    /// 85 and above
    VeryHigh,
    /// 70-84
    High,
    /// 50-69
    Moderate,
    /// Below 50
    Low,
}

impl std::fmt::Display for SuccessRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuccessRating::VeryHigh => write!(f, "very-high"),
            SuccessRating::High => write!(f, "high"),
            SuccessRating::Moderate => write!(f, "moderate"),
            SuccessRating::Low => write!(f, "low"),
        }
    }
}

/// Per-factor breakdown, each 0-100
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessFactors {
    pub location: u8,
    pub zone: u8,
    pub season: u8,
    pub weather: u8,
}

/// Estimated planting-outcome likelihood
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessProbability {
    pub probability: u8,
    pub rating: SuccessRating,
    pub factors: SuccessFactors,
    pub risk_factors: Vec<String>,
}

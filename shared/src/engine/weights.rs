//! Scoring weights and thresholds
//!
//! Region/zone partial credits are lenient business policy: a stated but
//! non-matching region still earns points.

// ============================================================================
// Compatibility (100-point scale before the weather bonus)
// ============================================================================

/// Profile region is one of the species' suitable regions
pub const REGION_WEIGHT: u32 = 35;
/// Profile agro-ecological zone is one of the species' suitable zones
pub const ZONE_WEIGHT: u32 = 35;
/// Share of stated conservation goals covered by the species' uses
pub const GOALS_WEIGHT: u32 = 30;

/// Region stated but not in the suitable set
pub const REGION_PARTIAL: u32 = 10;
/// Zone band (first two characters) matches a suitable zone
pub const ZONE_PREFIX_PARTIAL: u32 = 20;
/// Zone stated but neither exact nor band match
pub const ZONE_FALLBACK: u32 = 10;

/// Largest bonus live weather can add on top of the base score
pub const WEATHER_BONUS_MAX: u32 = 10;

pub const MAX_SCORE: u32 = 100;

// ============================================================================
// Success estimation
// ============================================================================

pub const SUCCESS_LOCATION_WEIGHT: u32 = 35;
pub const SUCCESS_ZONE_WEIGHT: u32 = 30;
pub const SUCCESS_SEASON_WEIGHT: u32 = 20;
pub const SUCCESS_WEATHER_WEIGHT: u32 = 15;

/// Factors below this value add a risk factor
pub const LOW_FACTOR_THRESHOLD: u8 = 50;
/// Weather factor used when no weather data is available
pub const NEUTRAL_WEATHER_FACTOR: u8 = 70;

pub const SEASON_FACTOR_OPTIMAL: u8 = 100;
pub const SEASON_FACTOR_ACCEPTABLE: u8 = 70;
pub const SEASON_FACTOR_POOR: u8 = 30;

pub const VERY_HIGH_THRESHOLD: u8 = 85;
pub const HIGH_THRESHOLD: u8 = 70;
pub const MODERATE_THRESHOLD: u8 = 50;

// ============================================================================
// Seasons
// ============================================================================

/// A window starting within this many months rates as acceptable
pub const ACCEPTABLE_LEAD_MONTHS: u32 = 2;

// ============================================================================
// Ranking and behavior
// ============================================================================

pub const DEFAULT_MIN_SCORE: u8 = 50;
/// Allowed range for the configured minimum score
pub const MIN_SCORE_RANGE: std::ops::RangeInclusive<u8> = 50..=60;

/// Largest shift (either direction) behavior data applies to a score
pub const BEHAVIOR_BIAS_POINTS: u32 = 5;
/// Peers with a goal-set Jaccard index strictly above this are "similar"
pub const SIMILARITY_THRESHOLD: f64 = 0.3;
/// Likelihood reported when there is nothing to compare against
pub const NEUTRAL_LIKELIHOOD: f64 = 0.5;

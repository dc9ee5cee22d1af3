//! WebAssembly module for TreeMatch
//!
//! Offline, client-side scoring with the same engine the server uses:
//! - Compatibility scoring and ranking
//! - Planting-season advice
//! - Success-probability estimates
//!
//! Inputs and outputs are JSON strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("TreeMatch engine loaded"));
}

#[derive(Debug, Deserialize)]
struct ScoreInput {
    species: TreeSpecies,
    #[serde(default)]
    profile: UserProfile,
    weather: Option<WeatherSnapshot>,
}

#[derive(Debug, Deserialize)]
struct RankInput {
    species: Vec<TreeSpecies>,
    #[serde(default)]
    profile: UserProfile,
    weather: Option<WeatherSnapshot>,
    min_score: Option<u8>,
}

#[derive(Debug, Serialize)]
struct RankedOutput<'a> {
    id: &'a str,
    common_name: &'a str,
    score: u8,
    compatibility: CompatibilityResult,
}

fn parse<'a, T: Deserialize<'a>>(json: &'a str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn checked_profile(profile: UserProfile) -> Result<UserProfile, String> {
    validate_profile(&profile).map_err(str::to_string)?;
    Ok(profile)
}

/// Today's date from the browser clock
fn today() -> Result<NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("Invalid system date"))
}

fn compatibility_json(input: &str) -> Result<String, String> {
    let input: ScoreInput = parse(input, "score input")?;
    let profile = checked_profile(input.profile)?;
    let result = shared::score_compatibility(&input.species, &profile, input.weather.as_ref());
    to_json(&result)
}

fn ranking_json(input: &str) -> Result<String, String> {
    let input: RankInput = parse(input, "rank input")?;
    let profile = checked_profile(input.profile)?;
    let min_score = input.min_score.unwrap_or(shared::DEFAULT_MIN_SCORE);
    let ranked = shared::rank(&input.species, &profile, input.weather.as_ref(), min_score)
        .map_err(|e| e.to_string())?;

    let output: Vec<RankedOutput> = ranked
        .iter()
        .map(|r| RankedOutput {
            id: &r.species.id,
            common_name: &r.species.common_name,
            score: r.score,
            compatibility: r.compatibility,
        })
        .collect();
    to_json(&output)
}

fn season_json(input: &str, today: NaiveDate) -> Result<String, String> {
    let input: ScoreInput = parse(input, "season input")?;
    let profile = checked_profile(input.profile)?;
    to_json(&shared::recommend_season(&input.species, &profile, today))
}

fn success_json(input: &str, today: NaiveDate) -> Result<String, String> {
    let input: ScoreInput = parse(input, "success input")?;
    let profile = checked_profile(input.profile)?;
    to_json(&shared::estimate_success(
        &input.species,
        &profile,
        input.weather.as_ref(),
        today,
    ))
}

/// Score one species: `{species, profile, weather?}` -> CompatibilityResult
#[wasm_bindgen]
pub fn score_compatibility(input_json: &str) -> Result<String, JsValue> {
    compatibility_json(input_json).map_err(|e| JsValue::from_str(&e))
}

/// Rank species: `{species: [...], profile, weather?, min_score?}`
#[wasm_bindgen]
pub fn rank_species(input_json: &str) -> Result<String, JsValue> {
    ranking_json(input_json).map_err(|e| JsValue::from_str(&e))
}

/// Planting-season advice as of today
#[wasm_bindgen]
pub fn recommend_season(input_json: &str) -> Result<String, JsValue> {
    season_json(input_json, today()?).map_err(|e| JsValue::from_str(&e))
}

/// Success-probability estimate as of today
#[wasm_bindgen]
pub fn estimate_success(input_json: &str) -> Result<String, JsValue> {
    success_json(input_json, today()?).map_err(|e| JsValue::from_str(&e))
}

/// Rating tier for a probability ("very-high", "high", "moderate", "low")
#[wasm_bindgen]
pub fn classify_success_probability(probability: u8) -> String {
    shared::classify_probability(probability.min(100)).to_string()
}

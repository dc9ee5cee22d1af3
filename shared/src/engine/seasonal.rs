//! Seasonal planting advice
//!
//! Two planting windows are recognized per location, chosen from latitude:
//! long/short rains near the equator, main/late rains in the tropics and
//! spring/autumn in temperate latitudes.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::weights::ACCEPTABLE_LEAD_MONTHS;
use crate::models::{SeasonRating, SeasonalRecommendation, TreeSpecies, UserProfile};

/// A planting window spanning `start_month..=end_month`, possibly wrapping
/// over the year end.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlantingWindow {
    pub name: &'static str,
    pub start_month: u32,
    pub end_month: u32,
}

impl PlantingWindow {
    const fn new(name: &'static str, start_month: u32, end_month: u32) -> Self {
        Self {
            name,
            start_month,
            end_month,
        }
    }

    pub fn contains(&self, month: u32) -> bool {
        if self.start_month <= self.end_month {
            month >= self.start_month && month <= self.end_month
        } else {
            month >= self.start_month || month <= self.end_month
        }
    }

    /// Months of the window in calendar order from its start
    pub fn months(&self) -> Vec<u32> {
        let mut months = Vec::new();
        let mut month = self.start_month;
        loop {
            months.push(month);
            if month == self.end_month {
                break;
            }
            month = month % 12 + 1;
        }
        months
    }

    /// "March-May"
    pub fn month_range(&self) -> String {
        format!(
            "{}-{}",
            month_name(self.start_month),
            month_name(self.end_month)
        )
    }
}

/// Climate band used to pick planting windows
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LatitudeBand {
    Equatorial,
    TropicalNorth,
    TropicalSouth,
    TemperateNorth,
    TemperateSouth,
}

const EQUATORIAL_LIMIT: i64 = 5;
const TROPIC_LIMIT: Decimal = Decimal::from_parts(235, 0, 0, false, 1);

/// Classify a latitude; unknown positions default to the equatorial band
pub fn latitude_band(latitude: Option<Decimal>) -> LatitudeBand {
    let Some(latitude) = latitude else {
        return LatitudeBand::Equatorial;
    };

    let magnitude = latitude.abs();
    if magnitude <= Decimal::from(EQUATORIAL_LIMIT) {
        LatitudeBand::Equatorial
    } else if magnitude <= TROPIC_LIMIT {
        if latitude.is_sign_positive() {
            LatitudeBand::TropicalNorth
        } else {
            LatitudeBand::TropicalSouth
        }
    } else if latitude.is_sign_positive() {
        LatitudeBand::TemperateNorth
    } else {
        LatitudeBand::TemperateSouth
    }
}

/// The two planting windows for a latitude band
pub fn planting_windows(band: LatitudeBand) -> [PlantingWindow; 2] {
    match band {
        LatitudeBand::Equatorial => [
            PlantingWindow::new("long rains", 3, 5),
            PlantingWindow::new("short rains", 10, 12),
        ],
        LatitudeBand::TropicalNorth => [
            PlantingWindow::new("main rains", 6, 8),
            PlantingWindow::new("late rains", 9, 10),
        ],
        LatitudeBand::TropicalSouth => [
            PlantingWindow::new("main rains", 11, 1),
            PlantingWindow::new("late rains", 2, 3),
        ],
        LatitudeBand::TemperateNorth => [
            PlantingWindow::new("spring", 3, 5),
            PlantingWindow::new("autumn", 9, 11),
        ],
        LatitudeBand::TemperateSouth => [
            PlantingWindow::new("spring", 9, 11),
            PlantingWindow::new("autumn", 3, 5),
        ],
    }
}

/// Months from `from` forward to `to` (0 when equal)
fn months_until(from: u32, to: u32) -> u32 {
    (to + 12 - from) % 12
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// Windows that apply to a profile, ordered nearest first relative to `month`
pub fn windows_for(profile: &UserProfile, month: u32) -> Vec<PlantingWindow> {
    let band = latitude_band(profile.location.map(|l| l.latitude));
    let mut windows = planting_windows(band).to_vec();
    windows.sort_by_key(|w| if w.contains(month) { 0 } else { months_until(month, w.start_month) });
    windows
}

/// Recommend when to plant a species, as of `today`
pub fn recommend_season(
    tree: &TreeSpecies,
    profile: &UserProfile,
    today: NaiveDate,
) -> SeasonalRecommendation {
    let month = today.month();
    let windows = windows_for(profile, month);
    let nearest = windows[0];
    let optimal_months: Vec<u32> = windows.iter().flat_map(|w| w.months()).collect();

    if nearest.contains(month) {
        return SeasonalRecommendation {
            can_plant_now: true,
            optimal_months,
            current_season_rating: SeasonRating::Optimal,
            next_optimal_date: today,
            advice: format!(
                "Now is a good time to plant {}: the {} ({}) are under way.",
                tree.display_name(),
                nearest.name,
                nearest.month_range()
            ),
        };
    }

    let lead = months_until(month, nearest.start_month);
    let year = if nearest.start_month < month {
        today.year() + 1
    } else {
        today.year()
    };
    let next_optimal_date = NaiveDate::from_ymd_opt(year, nearest.start_month, 1).unwrap_or(today);

    let (rating, advice) = if lead <= ACCEPTABLE_LEAD_MONTHS {
        (
            SeasonRating::Acceptable,
            format!(
                "The {} ({}) start soon. Prepare holes and seedlings of {} now.",
                nearest.name,
                nearest.month_range(),
                tree.display_name()
            ),
        )
    } else {
        (
            SeasonRating::Poor,
            format!(
                "Wait for the {} ({}) before planting {}.",
                nearest.name,
                nearest.month_range(),
                tree.display_name()
            ),
        )
    };

    SeasonalRecommendation {
        can_plant_now: false,
        optimal_months,
        current_season_rating: rating,
        next_optimal_date,
        advice,
    }
}

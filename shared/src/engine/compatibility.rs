//! Compatibility scoring of a species against a steward's profile
//!
//! Never hard-fails on missing profile fields: absent region, zone or goals
//! simply earn less credit.

use crate::engine::weather_fit::assess_weather_fit;
use crate::engine::weights::*;
use crate::models::{contains_ignore_case, CompatibilityResult, TreeSpecies, UserProfile, WeatherSnapshot};

/// Two-letter band of a zone code ("UH1" -> "UH"), uppercased
pub fn zone_band(zone: &str) -> Option<String> {
    let zone = zone.trim();
    let band: String = zone.chars().take(2).collect();
    if band.chars().count() < 2 {
        return None;
    }
    Some(band.to_uppercase())
}

/// Region credit: full on membership, partial if a region is stated at all
pub fn region_points(tree: &TreeSpecies, profile: &UserProfile) -> u32 {
    match profile.stated_region() {
        Some(region) if contains_ignore_case(&tree.suitable_regions, region) => REGION_WEIGHT,
        Some(_) => REGION_PARTIAL,
        None => 0,
    }
}

/// Zone credit: exact match, then band match, then a fallback for any stated zone
pub fn zone_points(tree: &TreeSpecies, profile: &UserProfile) -> u32 {
    let Some(zone) = profile.stated_zone() else {
        return 0;
    };

    if contains_ignore_case(&tree.suitable_zones, zone) {
        return ZONE_WEIGHT;
    }

    let band_matches = zone_band(zone).is_some_and(|band| {
        tree.suitable_zones
            .iter()
            .any(|suitable| zone_band(suitable).as_deref() == Some(band.as_str()))
    });

    if band_matches {
        ZONE_PREFIX_PARTIAL
    } else {
        ZONE_FALLBACK
    }
}

/// Goal credit proportional to the share of stated goals the species covers
pub fn goal_points(tree: &TreeSpecies, profile: &UserProfile) -> u32 {
    let goals: Vec<&str> = profile.stated_goals().collect();
    if goals.is_empty() {
        return 0;
    }

    let covered = goals
        .iter()
        .filter(|goal| contains_ignore_case(&tree.uses, goal))
        .count() as u32;
    let total = goals.len() as u32;

    (GOALS_WEIGHT * covered + total / 2) / total
}

/// Weather bonus, only when both live weather and a resolved location exist
pub fn weather_bonus(
    tree: &TreeSpecies,
    profile: &UserProfile,
    weather: Option<&WeatherSnapshot>,
) -> u32 {
    match (weather, profile.location.as_ref()) {
        (Some(weather), Some(_)) => {
            let fit = assess_weather_fit(tree, weather).percent();
            (WEATHER_BONUS_MAX * fit + 50) / 100
        }
        _ => 0,
    }
}

/// Base score without any weather influence
pub fn base_score(tree: &TreeSpecies, profile: &UserProfile) -> u32 {
    region_points(tree, profile) + zone_points(tree, profile) + goal_points(tree, profile)
}

/// Score a species against a profile, optionally boosted by live weather.
///
/// The result is always within 0..=100.
pub fn score_compatibility(
    tree: &TreeSpecies,
    profile: &UserProfile,
    weather: Option<&WeatherSnapshot>,
) -> CompatibilityResult {
    let region = region_points(tree, profile);
    let zone = zone_points(tree, profile);
    let goals = goal_points(tree, profile);
    let bonus = weather_bonus(tree, profile, weather);

    let score = (region + zone + goals + bonus).min(MAX_SCORE);

    CompatibilityResult {
        score: score as u8,
        region_points: region,
        zone_points: zone,
        goal_points: goals,
        weather_bonus: bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrowthRate;
    use crate::types::GpsCoordinates;
    use rust_decimal::Decimal;

    fn set(items: &[&str]) -> std::collections::BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn tree() -> TreeSpecies {
        TreeSpecies {
            id: "grevillea-robusta".to_string(),
            common_name: "Grevillea".to_string(),
            scientific_name: "Grevillea robusta".to_string(),
            local_name: None,
            suitable_regions: set(&["Nyeri"]),
            suitable_zones: set(&["UH1", "UH2"]),
            preferred_soils: set(&["loam"]),
            suitable_climates: set(&["highland"]),
            uses: set(&["timber", "shade"]),
            unit_price: Decimal::from(50),
            growth_rate: GrowthRate::Fast,
            min_land_size_acres: Decimal::ONE,
        }
    }

    fn profile(region: Option<&str>, zone: Option<&str>, goals: &[&str]) -> UserProfile {
        UserProfile {
            region: region.map(String::from),
            agro_zone: zone.map(String::from),
            conservation_goals: set(goals),
            ..Default::default()
        }
    }

    #[test]
    fn test_nyeri_timber_scores_at_least_90() {
        let result = score_compatibility(&tree(), &profile(Some("Nyeri"), Some("UH1"), &["timber"]), None);
        assert!(result.score >= 90);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_full_match_scores_100() {
        let result = score_compatibility(
            &tree(),
            &profile(Some("nyeri"), Some("uh2"), &["timber", "shade"]),
            None,
        );
        assert_eq!(result.score, 100);
        assert_eq!(result.weather_bonus, 0);
    }

    #[test]
    fn test_empty_profile_scores_zero() {
        let result = score_compatibility(&tree(), &UserProfile::default(), None);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_region_partial_credit_never_zero_when_stated() {
        assert_eq!(region_points(&tree(), &profile(Some("Kitui"), None, &[])), REGION_PARTIAL);
        assert_eq!(region_points(&tree(), &profile(None, None, &[])), 0);
    }

    #[test]
    fn test_zone_band_partial_credit() {
        assert_eq!(zone_points(&tree(), &profile(None, Some("UH3"), &[])), ZONE_PREFIX_PARTIAL);
        assert_eq!(zone_points(&tree(), &profile(None, Some("LM4"), &[])), ZONE_FALLBACK);
        assert_eq!(zone_points(&tree(), &profile(None, Some("UH1"), &[])), ZONE_WEIGHT);
    }

    #[test]
    fn test_goal_points_proportional() {
        assert_eq!(goal_points(&tree(), &profile(None, None, &["timber", "fruit"])), 15);
        assert_eq!(goal_points(&tree(), &profile(None, None, &["fruit"])), 0);
        assert_eq!(
            goal_points(&tree(), &profile(None, None, &["timber", "fruit", "fodder"])),
            10
        );
    }

    #[test]
    fn test_weather_bonus_requires_location() {
        let weather = WeatherSnapshot::new(Decimal::from(18), 65, Decimal::from(1400));
        let without_location = profile(Some("Kitui"), None, &[]);
        assert_eq!(weather_bonus(&tree(), &without_location, Some(&weather)), 0);

        let mut with_location = without_location.clone();
        with_location.location = Some(GpsCoordinates::new(Decimal::new(-42, 2), Decimal::new(3695, 2)));
        assert_eq!(weather_bonus(&tree(), &with_location, Some(&weather)), WEATHER_BONUS_MAX);
        assert_eq!(
            score_compatibility(&tree(), &with_location, Some(&weather)).score,
            (REGION_PARTIAL + WEATHER_BONUS_MAX) as u8
        );
    }

    #[test]
    fn test_weather_bonus_capped_at_100() {
        let mut full = profile(Some("Nyeri"), Some("UH1"), &["timber"]);
        full.location = Some(GpsCoordinates::new(Decimal::new(-42, 2), Decimal::new(3695, 2)));
        let weather = WeatherSnapshot::new(Decimal::from(18), 65, Decimal::from(1400));
        assert_eq!(score_compatibility(&tree(), &full, Some(&weather)).score, 100);
    }

    #[test]
    fn test_zone_band() {
        assert_eq!(zone_band("uh1").as_deref(), Some("UH"));
        assert_eq!(zone_band(" LM ").as_deref(), Some("LM"));
        assert_eq!(zone_band("U"), None);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn tag() -> impl Strategy<Value = String> {
            prop::sample::select(vec!["timber", "Shade", "fruit", "fodder", "UH1", "lm5", "Nyeri"])
                .prop_map(str::to_string)
        }

        proptest! {
            #[test]
            fn prop_components_stay_within_weights(
                region in prop::option::of(tag()),
                zone in prop::option::of(tag()),
                goals in prop::collection::btree_set(tag(), 0..5),
                humidity in 0i32..=100,
            ) {
                let profile = UserProfile {
                    region,
                    agro_zone: zone,
                    conservation_goals: goals,
                    location: Some(GpsCoordinates::new(Decimal::new(-42, 2), Decimal::new(3695, 2))),
                    ..Default::default()
                };
                let weather = WeatherSnapshot::new(Decimal::from(20), humidity, Decimal::from(1200));
                let result = score_compatibility(&tree(), &profile, Some(&weather));

                prop_assert!(result.region_points <= REGION_WEIGHT);
                prop_assert!(result.zone_points <= ZONE_WEIGHT);
                prop_assert!(result.goal_points <= GOALS_WEIGHT);
                prop_assert!(result.weather_bonus <= WEATHER_BONUS_MAX);
                prop_assert!(result.score <= 100);
                let total = result.region_points + result.zone_points + result.goal_points + result.weather_bonus;
                prop_assert_eq!(u32::from(result.score), total.min(MAX_SCORE));
            }
        }
    }
}

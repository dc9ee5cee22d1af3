//! Ranking of the species catalog for one profile

use serde::Serialize;

use crate::engine::compatibility::score_compatibility;
use crate::engine::weights::{BEHAVIOR_BIAS_POINTS, MAX_SCORE, NEUTRAL_LIKELIHOOD};
use crate::models::{CompatibilityResult, TreeSpecies, UserProfile, WeatherSnapshot};
use crate::types::EngineError;

/// A species that cleared the threshold, with its score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedSpecies<'a> {
    pub species: &'a TreeSpecies,
    pub compatibility: CompatibilityResult,
    /// Score after any behavior bias; equals `compatibility.score` when unbiased
    pub score: u8,
}

fn check_min_score(min_score: u8) -> Result<(), EngineError> {
    if u32::from(min_score) > MAX_SCORE {
        return Err(EngineError::InvalidMinScore(min_score));
    }
    Ok(())
}

fn sort_and_filter(mut ranked: Vec<RankedSpecies<'_>>, min_score: u8) -> Vec<RankedSpecies<'_>> {
    ranked.retain(|r| r.score >= min_score);
    // `sort_by` is stable, so equal scores keep catalog order
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Score every species, drop those below `min_score`, sort descending
pub fn rank<'a>(
    trees: &'a [TreeSpecies],
    profile: &UserProfile,
    weather: Option<&WeatherSnapshot>,
    min_score: u8,
) -> Result<Vec<RankedSpecies<'a>>, EngineError> {
    check_min_score(min_score)?;

    let ranked = trees
        .iter()
        .map(|species| {
            let compatibility = score_compatibility(species, profile, weather);
            RankedSpecies {
                species,
                compatibility,
                score: compatibility.score,
            }
        })
        .collect();

    Ok(sort_and_filter(ranked, min_score))
}

/// Shift a score by behavior likelihood (0..=1) within ±`BEHAVIOR_BIAS_POINTS`
pub fn apply_behavior_bias(score: u8, likelihood: f64) -> u8 {
    let likelihood = if likelihood.is_finite() {
        likelihood.clamp(0.0, 1.0)
    } else {
        NEUTRAL_LIKELIHOOD
    };
    let shift = ((likelihood - NEUTRAL_LIKELIHOOD) * 2.0 * f64::from(BEHAVIOR_BIAS_POINTS)).round();
    (f64::from(score) + shift).clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Like [`rank`], but biased by a per-species likelihood from behavior data
pub fn rank_personalized<'a, F>(
    trees: &'a [TreeSpecies],
    profile: &UserProfile,
    weather: Option<&WeatherSnapshot>,
    min_score: u8,
    likelihood: F,
) -> Result<Vec<RankedSpecies<'a>>, EngineError>
where
    F: Fn(&TreeSpecies) -> f64,
{
    check_min_score(min_score)?;

    let ranked = trees
        .iter()
        .map(|species| {
            let compatibility = score_compatibility(species, profile, weather);
            RankedSpecies {
                species,
                compatibility,
                score: apply_behavior_bias(compatibility.score, likelihood(species)),
            }
        })
        .collect();

    Ok(sort_and_filter(ranked, min_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GrowthRate;
    use rust_decimal::Decimal;

    fn species(id: &str, regions: &[&str], zones: &[&str]) -> TreeSpecies {
        TreeSpecies {
            id: id.to_string(),
            common_name: id.to_string(),
            scientific_name: id.to_string(),
            local_name: None,
            suitable_regions: regions.iter().map(|s| s.to_string()).collect(),
            suitable_zones: zones.iter().map(|s| s.to_string()).collect(),
            preferred_soils: Default::default(),
            suitable_climates: Default::default(),
            uses: ["timber".to_string()].into_iter().collect(),
            unit_price: Decimal::from(40),
            growth_rate: GrowthRate::Medium,
            min_land_size_acres: Decimal::ONE,
        }
    }

    fn catalog() -> Vec<TreeSpecies> {
        vec![
            species("a", &["Kitui"], &["LM5"]),
            species("b", &["Nyeri"], &["UH1"]),
            species("c", &["Nyeri"], &["UH2"]),
            species("d", &["Nyeri"], &["UH1"]),
        ]
    }

    fn profile() -> UserProfile {
        UserProfile {
            region: Some("Nyeri".to_string()),
            agro_zone: Some("UH1".to_string()),
            conservation_goals: ["timber".to_string()].into_iter().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_filters_and_sorts() {
        let trees = catalog();
        let ranked = rank(&trees, &profile(), None, 50).unwrap();
        let ids: Vec<&str> = ranked.iter().map(|r| r.species.id.as_str()).collect();
        // a: 10 + 10 + 30 = 50, b/d: 100, c: 35 + 20 + 30 = 85
        assert_eq!(ids, vec!["b", "d", "c", "a"]);

        let strict = rank(&trees, &profile(), None, 60).unwrap();
        assert!(strict.iter().all(|r| r.score >= 60));
        assert_eq!(strict.len(), 3);
    }

    #[test]
    fn test_rank_keeps_catalog_order_on_ties() {
        let trees = catalog();
        let ranked = rank(&trees, &profile(), None, 0).unwrap();
        assert_eq!(ranked[0].species.id, "b");
        assert_eq!(ranked[1].species.id, "d");
    }

    #[test]
    fn test_rank_rejects_min_score_above_100() {
        assert_eq!(
            rank(&catalog(), &profile(), None, 101).unwrap_err(),
            EngineError::InvalidMinScore(101)
        );
    }

    #[test]
    fn test_behavior_bias_bounds() {
        assert_eq!(apply_behavior_bias(80, 0.5), 80);
        assert_eq!(apply_behavior_bias(80, 1.0), 85);
        assert_eq!(apply_behavior_bias(80, 0.0), 75);
        assert_eq!(apply_behavior_bias(98, 1.0), 100);
        assert_eq!(apply_behavior_bias(2, 0.0), 0);
        assert_eq!(apply_behavior_bias(60, f64::NAN), 60);
    }

    #[test]
    fn test_rank_personalized_reorders_ties() {
        let trees = catalog();
        let ranked = rank_personalized(&trees, &profile(), None, 50, |tree| {
            if tree.id == "b" {
                0.1
            } else {
                0.5
            }
        })
        .unwrap();
        assert_eq!(ranked[0].species.id, "d");
        assert_eq!(ranked[1].species.id, "b");
        assert_eq!(ranked[1].score, 96);
        assert_eq!(ranked[1].compatibility.score, 100);
    }
}

//! Recommendation service: glues the pure engine to catalog, zone and
//! weather collaborators

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    estimate_success, rank, rank_personalized, recommend_season, validate_profile,
    CompatibilityResult, SeasonalRecommendation, SuccessProbability, TreeSpecies, UserProfile,
    WeatherSnapshot,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::behavior::BehaviorLedger;
use crate::services::catalog::SpeciesCatalog;
use crate::services::weather::{fetch_optional, WeatherGateway};
use crate::services::zone::ZoneResolver;

/// A ranked species as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub species: TreeSpecies,
    pub score: u8,
    pub compatibility: CompatibilityResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationList {
    pub profile: UserProfile,
    pub weather: Option<WeatherSnapshot>,
    pub min_score: u8,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesSeason {
    pub species_id: String,
    pub season: SeasonalRecommendation,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpeciesSuccess {
    pub species_id: String,
    pub weather: Option<WeatherSnapshot>,
    pub success: SuccessProbability,
}

/// Recommendation service
#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<SpeciesCatalog>,
    zones: Arc<ZoneResolver>,
    weather: Arc<dyn WeatherGateway>,
    ledger: BehaviorLedger,
}

impl RecommendationService {
    pub fn new(
        catalog: Arc<SpeciesCatalog>,
        zones: Arc<ZoneResolver>,
        weather: Arc<dyn WeatherGateway>,
        ledger: BehaviorLedger,
    ) -> Self {
        Self {
            catalog,
            zones,
            weather,
            ledger,
        }
    }

    /// Validate a profile and fill region/zone gaps from its location
    pub async fn prepare_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        validate_profile(&profile).map_err(|e| AppError::ValidationError(e.to_string()))?;

        if profile.stated_region().is_some() && profile.stated_zone().is_some() {
            return Ok(profile);
        }

        if let Some(location) = profile.location {
            let zone = self.zones.resolve_zone(location).await?;
            return Ok(profile.with_zone_info(&zone));
        }

        if let Some(region) = profile.stated_region() {
            let zone = self.zones.resolve_region(region);
            return Ok(profile.with_zone_info(&zone));
        }

        Ok(profile)
    }

    async fn weather_for(&self, profile: &UserProfile) -> Option<WeatherSnapshot> {
        fetch_optional(self.weather.as_ref(), profile.location).await
    }

    fn species(&self, id: &str) -> AppResult<&TreeSpecies> {
        self.catalog
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Species {}", id)))
    }

    /// Rank the catalog for a profile. With `user_id`, scores are biased by
    /// similar users' reactions.
    pub async fn recommend(
        &self,
        profile: UserProfile,
        min_score: u8,
        user_id: Option<Uuid>,
    ) -> AppResult<RecommendationList> {
        let profile = self.prepare_profile(profile).await?;
        let weather = self.weather_for(&profile).await;
        let trees = self.catalog.all();

        let ranked = match user_id {
            Some(user_id) => {
                let likelihoods = self.ledger.likelihoods(user_id, trees).await?;
                rank_personalized(trees, &profile, weather.as_ref(), min_score, |tree| {
                    likelihoods
                        .get(&tree.id)
                        .copied()
                        .unwrap_or(shared::NEUTRAL_LIKELIHOOD)
                })?
            }
            None => rank(trees, &profile, weather.as_ref(), min_score)?,
        };

        tracing::debug!(
            "Ranked {} of {} species at min score {}",
            ranked.len(),
            trees.len(),
            min_score
        );

        let recommendations = ranked
            .into_iter()
            .map(|r| Recommendation {
                species: r.species.clone(),
                score: r.score,
                compatibility: r.compatibility,
            })
            .collect();

        Ok(RecommendationList {
            profile,
            weather,
            min_score,
            recommendations,
        })
    }

    /// Planting-season advice for one species
    pub async fn season(
        &self,
        species_id: &str,
        profile: UserProfile,
        today: NaiveDate,
    ) -> AppResult<SpeciesSeason> {
        let tree = self.species(species_id)?;
        let profile = self.prepare_profile(profile).await?;
        Ok(SpeciesSeason {
            species_id: tree.id.clone(),
            season: recommend_season(tree, &profile, today),
        })
    }

    /// Success-probability estimate for one species
    pub async fn success(
        &self,
        species_id: &str,
        profile: UserProfile,
        today: NaiveDate,
    ) -> AppResult<SpeciesSuccess> {
        let tree = self.species(species_id)?;
        let profile = self.prepare_profile(profile).await?;
        let weather = self.weather_for(&profile).await;
        Ok(SpeciesSuccess {
            species_id: tree.id.clone(),
            success: estimate_success(tree, &profile, weather.as_ref(), today),
            weather,
        })
    }
}

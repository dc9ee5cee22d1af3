//! Species catalog loading
//!
//! The catalog is read once at startup and shared read-only. CSV rows keep
//! list-valued columns in a single field separated by `;`.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{GrowthRate, TreeSpecies};

use crate::error::{AppError, AppResult};

/// Read-only species reference data
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    species: Vec<TreeSpecies>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    common_name: String,
    scientific_name: String,
    #[serde(default)]
    local_name: Option<String>,
    #[serde(default)]
    suitable_regions: String,
    #[serde(default)]
    suitable_zones: String,
    #[serde(default)]
    preferred_soils: String,
    #[serde(default)]
    suitable_climates: String,
    #[serde(default)]
    uses: String,
    unit_price: Decimal,
    growth_rate: String,
    min_land_size_acres: Decimal,
}

fn split_list(field: &str) -> BTreeSet<String> {
    field
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl TryFrom<CatalogRow> for TreeSpecies {
    type Error = AppError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        let growth_rate = GrowthRate::from_str(&row.growth_rate)
            .map_err(|e| AppError::Configuration(format!("Species {}: {}", row.id, e)))?;

        Ok(TreeSpecies {
            id: row.id,
            common_name: row.common_name,
            scientific_name: row.scientific_name,
            local_name: row.local_name.filter(|n| !n.trim().is_empty()),
            suitable_regions: split_list(&row.suitable_regions),
            suitable_zones: split_list(&row.suitable_zones),
            preferred_soils: split_list(&row.preferred_soils),
            suitable_climates: split_list(&row.suitable_climates),
            uses: split_list(&row.uses),
            unit_price: row.unit_price,
            growth_rate,
            min_land_size_acres: row.min_land_size_acres,
        })
    }
}

impl SpeciesCatalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(species: Vec<TreeSpecies>) -> AppResult<Self> {
        let mut index = HashMap::with_capacity(species.len());
        for (position, tree) in species.iter().enumerate() {
            if tree.id.trim().is_empty() {
                return Err(AppError::Configuration(
                    "Species with empty id in catalog".to_string(),
                ));
            }
            if index.insert(tree.id.clone(), position).is_some() {
                return Err(AppError::Configuration(format!(
                    "Duplicate species id in catalog: {}",
                    tree.id
                )));
            }
        }
        Ok(Self { species, index })
    }

    /// Parse CSV catalog data (header row required)
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> AppResult<Self> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut species = Vec::new();
        for row in csv.deserialize::<CatalogRow>() {
            let row = row.map_err(|e| AppError::Configuration(format!("Invalid catalog row: {}", e)))?;
            species.push(TreeSpecies::try_from(row)?);
        }
        Self::new(species)
    }

    /// Parse a JSON array of species
    pub fn from_json_str(data: &str) -> AppResult<Self> {
        let species: Vec<TreeSpecies> = serde_json::from_str(data)
            .map_err(|e| AppError::Configuration(format!("Invalid catalog JSON: {}", e)))?;
        Self::new(species)
    }

    /// Load from a `.csv` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let catalog = if is_json {
            let data = std::fs::read_to_string(path).map_err(|e| {
                AppError::Configuration(format!("Cannot read catalog {}: {}", path.display(), e))
            })?;
            Self::from_json_str(&data)?
        } else {
            let file = std::fs::File::open(path).map_err(|e| {
                AppError::Configuration(format!("Cannot open catalog {}: {}", path.display(), e))
            })?;
            Self::from_csv_reader(file)?
        };

        tracing::info!("Loaded {} species from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&TreeSpecies> {
        self.index.get(id).map(|&position| &self.species[position])
    }

    pub fn all(&self) -> &[TreeSpecies] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

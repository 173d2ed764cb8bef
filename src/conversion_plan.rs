//! Cost and carbon estimate for turning a stretch of asphalt into planted area.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{require_positive, PlantingError},
    species::Species,
};

const FRACTION_TOLERANCE: f64 = 1e-6;

fn default_spacing_sqft_per_tree() -> f64 {
    100.0
}

fn default_cost_removal_per_sqft() -> f64 {
    10.0
}

fn default_maintenance_years() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub asphalt_sqft: f64,
    pub species_distribution: BTreeMap<Species, f64>,
    #[serde(default = "default_spacing_sqft_per_tree")]
    pub spacing_sqft_per_tree: f64,
    #[serde(default = "default_cost_removal_per_sqft")]
    pub cost_removal_per_sqft: f64,
    #[serde(default = "default_maintenance_years")]
    pub maintenance_years: u32,
}

impl ConversionRequest {
    pub fn new(asphalt_sqft: f64, species_distribution: BTreeMap<Species, f64>) -> Self {
        Self {
            asphalt_sqft,
            species_distribution,
            spacing_sqft_per_tree: default_spacing_sqft_per_tree(),
            cost_removal_per_sqft: default_cost_removal_per_sqft(),
            maintenance_years: default_maintenance_years(),
        }
    }

    pub fn validate(&self) -> Result<(), PlantingError> {
        require_positive("asphalt_sqft", self.asphalt_sqft)?;
        require_positive("spacing_sqft_per_tree", self.spacing_sqft_per_tree)?;
        if !(self.cost_removal_per_sqft.is_finite() && self.cost_removal_per_sqft >= 0.0) {
            return Err(PlantingError::InvalidValue(format!(
                "cost_removal_per_sqft must be non-negative, got {}",
                self.cost_removal_per_sqft
            )));
        }
        let mut sum = 0.0;
        for (species, fraction) in &self.species_distribution {
            if !(0.0..=1.0).contains(fraction) {
                return Err(PlantingError::InvalidValue(format!(
                    "fraction for {} must be within [0, 1], got {fraction}",
                    species.name()
                )));
            }
            sum += fraction;
        }
        if sum > 1.0 + FRACTION_TOLERANCE {
            return Err(PlantingError::InvalidValue(format!(
                "species fractions sum to {sum}, more than 1"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionPlan {
    pub asphalt_removal_cost: f64,
    pub trees_planted_per_species: BTreeMap<Species, u64>,
    pub total_trees: u64,
    pub planting_cost: f64,
    pub total_maintenance_cost: f64,
    pub total_co2_reduction_kg: f64,
    pub total_cost: f64,
}

/// Partial trees are dropped both when sizing the site and when splitting it
/// between species.
pub fn plan_asphalt_conversion(request: &ConversionRequest) -> Result<ConversionPlan, PlantingError> {
    request.validate()?;

    let asphalt_removal_cost = request.asphalt_sqft * request.cost_removal_per_sqft;
    let capacity = (request.asphalt_sqft / request.spacing_sqft_per_tree).floor() as u64;
    let years = f64::from(request.maintenance_years);

    let mut trees_planted_per_species = BTreeMap::new();
    let mut total_trees = 0;
    let mut planting_cost = 0.0;
    let mut total_maintenance_cost = 0.0;
    let mut total_co2_reduction_kg = 0.0;

    for (&species, &fraction) in &request.species_distribution {
        let trees = (capacity as f64 * fraction).floor() as u64;
        let data = species.data();
        let count = trees as f64;
        planting_cost += count * data.planting_cost;
        total_maintenance_cost += count * data.maintenance_cost * years;
        total_co2_reduction_kg += count * data.co2_per_year * years;
        total_trees += trees;
        trees_planted_per_species.insert(species, trees);
    }

    Ok(ConversionPlan {
        asphalt_removal_cost,
        trees_planted_per_species,
        total_trees,
        planting_cost,
        total_maintenance_cost,
        total_co2_reduction_kg,
        total_cost: asphalt_removal_cost + planting_cost + total_maintenance_cost,
    })
}

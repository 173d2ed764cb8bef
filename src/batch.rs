use log::{debug, info};
use rand::{seq::index, Rng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::{
    error::{require_positive, PlantingError},
    rectangle::Rectangle,
    rng::{self, RngManager},
    sampler::{sample_rectangle, tree_count, Tree},
};

/// Most trees one call to [`Planter::plant`] may produce.
pub const MAX_TREES_PER_BATCH: usize = 5_000_000;

/// Aggregate figures for one batch. `expected_tree_count` ignores the per-rectangle
/// floor of one tree, so it can fall below `actual_tree_count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub rectangles: usize,
    pub density: f64,
    pub total_area: f64,
    pub expected_tree_count: usize,
    pub actual_tree_count: usize,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub trees: Vec<Tree>,
    pub summary: BatchSummary,
}

pub fn total_area(rectangles: &[Rectangle]) -> f64 {
    rectangles.iter().map(Rectangle::area).sum()
}

pub fn expected_tree_count(total_area: f64, density: f64) -> usize {
    (total_area * density).round() as usize
}

/// Runs the sampler across a collection of rectangles.
pub struct Planter {
    positions: ChaCha8Rng,
    species: ChaCha8Rng,
}

impl Planter {
    pub fn new(rng: &RngManager) -> Self {
        Self {
            positions: rng.stream(rng::POSITIONS),
            species: rng.stream(rng::SPECIES),
        }
    }

    /// Trees come back in rectangle order, then draw order within a rectangle.
    /// Every rectangle is validated and counted first so a bad one, or a batch
    /// over [`MAX_TREES_PER_BATCH`], yields no output at all.
    pub fn plant(
        &mut self,
        rectangles: &[Rectangle],
        density: f64,
    ) -> Result<BatchResult, PlantingError> {
        require_positive("density", density)?;
        let mut planned = 0usize;
        for rectangle in rectangles {
            planned = planned.saturating_add(tree_count(rectangle, density)?);
        }
        if planned > MAX_TREES_PER_BATCH {
            return Err(PlantingError::InvalidValue(format!(
                "{planned} trees requested, limit is {MAX_TREES_PER_BATCH}"
            )));
        }

        let mut trees = Vec::with_capacity(planned);
        for (index, rectangle) in rectangles.iter().enumerate() {
            let sampled =
                sample_rectangle(rectangle, density, &mut self.positions, &mut self.species)?;
            debug!(
                "rectangle {index} ({:?}, {:.1} m2): {} trees",
                rectangle.area_type,
                rectangle.area(),
                sampled.len()
            );
            trees.extend(sampled);
        }

        let total_area = total_area(rectangles);
        let summary = BatchSummary {
            rectangles: rectangles.len(),
            density,
            total_area,
            expected_tree_count: expected_tree_count(total_area, density),
            actual_tree_count: trees.len(),
        };
        info!(
            "planted {} trees over {} rectangles ({:.1} m2, expected {})",
            summary.actual_tree_count,
            summary.rectangles,
            summary.total_area,
            summary.expected_tree_count
        );
        Ok(BatchResult { trees, summary })
    }
}

/// Keep `round(percentage × n)` rectangles picked uniformly without
/// replacement, in their original order.
pub fn select_coverage<R: Rng + ?Sized>(
    rectangles: &[Rectangle],
    percentage: f64,
    rng: &mut R,
) -> Result<Vec<Rectangle>, PlantingError> {
    if !(0.0..=1.0).contains(&percentage) {
        return Err(PlantingError::InvalidValue(format!(
            "percentage must be within [0, 1], got {percentage}"
        )));
    }
    let keep = ((rectangles.len() as f64) * percentage).round() as usize;
    let mut picked = index::sample(rng, rectangles.len(), keep.min(rectangles.len())).into_vec();
    picked.sort_unstable();
    Ok(picked.into_iter().map(|i| rectangles[i].clone()).collect())
}

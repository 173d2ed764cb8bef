use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    error::{require_positive, PlantingError},
    rectangle::Rectangle,
    species::Species,
    units::offset_from_anchor,
};

/// A sampled tree position. Output only; nothing tracks it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "tree_type")]
    pub species: Species,
}

/// Meters west (`width`) and south (`length`) of a rectangle's anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offset {
    pub width: f64,
    pub length: f64,
}

/// Most trees a single rectangle may ask for.
pub const MAX_TREES_PER_RECTANGLE: usize = 1_000_000;

/// `max(1, round(area × density))`, rejected when above
/// [`MAX_TREES_PER_RECTANGLE`].
pub fn tree_count(rectangle: &Rectangle, density: f64) -> Result<usize, PlantingError> {
    rectangle.validate()?;
    require_positive("density", density)?;
    let count = (rectangle.area() * density).round().max(1.0);
    if count > MAX_TREES_PER_RECTANGLE as f64 {
        return Err(PlantingError::InvalidValue(format!(
            "{count} trees requested for one rectangle, limit is {MAX_TREES_PER_RECTANGLE}"
        )));
    }
    Ok(count as usize)
}

/// Uniform draws on `[0, width) × [0, length)`. Panics on a rectangle that
/// fails [`Rectangle::validate`].
pub fn sample_offsets<R: Rng + ?Sized>(
    rectangle: &Rectangle,
    count: usize,
    rng: &mut R,
) -> Vec<Offset> {
    (0..count)
        .map(|_| Offset {
            width: rng.gen_range(0.0..rectangle.width_meters),
            length: rng.gen_range(0.0..rectangle.length_meters),
        })
        .collect()
}

pub fn place(rectangle: &Rectangle, offset: Offset, species: Species) -> Tree {
    let (latitude, longitude) = offset_from_anchor(
        rectangle.top_right_latitude,
        rectangle.top_right_longitude,
        offset.width,
        offset.length,
    );
    Tree {
        latitude,
        longitude,
        species,
    }
}

/// Scatter trees over one rectangle.
///
/// Positions and species come from separate generators; the two draws per tree
/// are independent. Arguments are checked before anything is drawn.
pub fn sample_rectangle<P, S>(
    rectangle: &Rectangle,
    density: f64,
    positions: &mut P,
    species: &mut S,
) -> Result<Vec<Tree>, PlantingError>
where
    P: Rng + ?Sized,
    S: Rng + ?Sized,
{
    let count = tree_count(rectangle, density)?;
    let trees = sample_offsets(rectangle, count, positions)
        .into_iter()
        .map(|offset| place(rectangle, offset, Species::random(species)))
        .collect();
    Ok(trees)
}

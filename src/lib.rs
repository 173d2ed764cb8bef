pub mod batch;
pub mod config;
pub mod conversion_plan;
pub mod error;
pub mod geodesy;
pub mod loader;
pub mod logger;
pub mod rectangle;
pub mod rng;
pub mod sampler;
pub mod species;
pub mod units;
pub mod web;

pub use batch::{BatchResult, BatchSummary, Planter};
pub use error::PlantingError;
pub use geodesy::Coordinate;
pub use rectangle::{AreaType, Rectangle};
pub use sampler::Tree;

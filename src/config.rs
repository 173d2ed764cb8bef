use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    error::{require_positive, PlantingError},
    loader::{self, ParkingRectangles},
    rectangle::{AreaType, Rectangle},
};

fn default_density() -> f64 {
    0.01
}

fn default_offset_meters() -> f64 {
    1.5
}

fn default_width_meters() -> f64 {
    3.0
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_area_type() -> AreaType {
    AreaType::ParkingLot
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub name: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_density")]
    pub density: f64,
    #[serde(default)]
    pub datasets: Vec<DatasetConfig>,
    #[serde(default)]
    pub street: StreetConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// JSON array of `{latitude, longitude, width, length}` records.
    Rectangles,
    /// CSV with a `shape` LINESTRING column.
    StreetSegments,
    /// CSV with `shape` and a `PRKG_SPLY` parking supply column.
    StreetParking,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub kind: DatasetKind,
    #[serde(default = "default_area_type")]
    pub area_type: AreaType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreetConfig {
    #[serde(default = "default_offset_meters")]
    pub offset_meters: f64,
    #[serde(default = "default_width_meters")]
    pub width_meters: f64,
}

impl StreetConfig {
    pub fn validate(&self) -> Result<(), PlantingError> {
        require_positive("width_meters", self.width_meters)?;
        if !self.offset_meters.is_finite() {
            return Err(PlantingError::InvalidValue(format!(
                "offset_meters must be finite, got {}",
                self.offset_meters
            )));
        }
        Ok(())
    }
}

impl Default for StreetConfig {
    fn default() -> Self {
        Self {
            offset_meters: default_offset_meters(),
            width_meters: default_width_meters(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Resolves config files and the dataset paths inside them against a base
/// directory.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<RunConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: RunConfig = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        let config_dir = path.parent().unwrap_or(&self.base_dir).to_path_buf();
        for dataset in &mut config.datasets {
            dataset.path = config_dir.join(&dataset.path);
        }
        config
            .street
            .validate()
            .with_context(|| format!("Invalid street section in {}", path.display()))?;
        require_positive("density", config.density)
            .with_context(|| format!("Invalid density in {}", path.display()))?;
        Ok(config)
    }
}

impl RunConfig {
    /// Every configured dataset, concatenated in config order.
    pub fn load_rectangles(&self) -> Result<Vec<Rectangle>> {
        let mut rectangles = Vec::new();
        for dataset in &self.datasets {
            let path = &dataset.path;
            let loaded = match dataset.kind {
                DatasetKind::Rectangles => loader::load_rectangles_json(path, dataset.area_type),
                DatasetKind::StreetSegments => loader::load_street_segments(path, &self.street),
                DatasetKind::StreetParking => loader::load_street_parking(path, &self.street)
                    .map(|ParkingRectangles { rectangles, .. }| rectangles),
            }
            .with_context(|| format!("Failed to load dataset {}", path.display()))?;
            log::info!("{}: {} rectangles", path.display(), loaded.len());
            rectangles.extend(loaded);
        }
        Ok(rectangles)
    }
}

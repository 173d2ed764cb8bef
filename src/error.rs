use thiserror::Error;

/// Failures raised by the placement engine before any sampling happens.
///
/// Inputs near the poles or the antimeridian are not detected; results there are
/// geometrically meaningless but no error is raised for them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlantingError {
    #[error("invalid argument: {name} must be positive, got {value}")]
    InvalidArgument { name: &'static str, value: f64 },
    #[error("invalid argument: {0}")]
    InvalidValue(String),
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

impl PlantingError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            PlantingError::InvalidArgument { .. } | PlantingError::InvalidValue(_)
        )
    }
}

/// Rejects zero, negative and non-finite values.
pub fn require_positive(name: &'static str, value: f64) -> Result<f64, PlantingError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlantingError::InvalidArgument { name, value })
    }
}

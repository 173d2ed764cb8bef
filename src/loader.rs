use std::{fs, path::Path};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::StreetConfig,
    error::PlantingError,
    geodesy::Coordinate,
    rectangle::{street_side_rectangles, AreaType, Rectangle},
};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed linestring '{0}'")]
    Linestring(String),
    #[error(transparent)]
    Invalid(#[from] PlantingError),
}

/// One rectangle as stored in the planting-area JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectangleRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub width: f64,
    pub length: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_type: Option<AreaType>,
}

impl RectangleRecord {
    pub fn into_rectangle(self, default_area_type: AreaType) -> Result<Rectangle, PlantingError> {
        Rectangle::new(
            Coordinate::new(self.latitude, self.longitude),
            self.width,
            self.length,
            self.area_type.unwrap_or(default_area_type),
        )
    }
}

impl From<&Rectangle> for RectangleRecord {
    fn from(rectangle: &Rectangle) -> Self {
        Self {
            latitude: rectangle.top_right_latitude,
            longitude: rectangle.top_right_longitude,
            width: rectangle.width_meters,
            length: rectangle.length_meters,
            area_type: Some(rectangle.area_type),
        }
    }
}

/// Records with non-positive dimensions are skipped.
pub fn parse_rectangles_json(
    text: &str,
    default_area_type: AreaType,
) -> Result<Vec<Rectangle>, DatasetError> {
    let records: Vec<RectangleRecord> = serde_json::from_str(text)?;
    let mut rectangles = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match record.into_rectangle(default_area_type) {
            Ok(rectangle) => rectangles.push(rectangle),
            Err(err) => warn!("skipping rectangle record {index}: {err}"),
        }
    }
    Ok(rectangles)
}

pub fn load_rectangles_json(
    path: impl AsRef<Path>,
    default_area_type: AreaType,
) -> Result<Vec<Rectangle>, DatasetError> {
    let text = fs::read_to_string(path)?;
    parse_rectangles_json(&text, default_area_type)
}

pub fn write_rectangles_json(
    path: impl AsRef<Path>,
    rectangles: &[Rectangle],
) -> Result<(), DatasetError> {
    let records: Vec<RectangleRecord> = rectangles.iter().map(RectangleRecord::from).collect();
    fs::write(path, serde_json::to_string_pretty(&records)?)?;
    Ok(())
}

/// Parse `LINESTRING (lon lat, lon lat, ...)` into latitude/longitude points.
pub fn parse_linestring(text: &str) -> Result<Vec<Coordinate>, DatasetError> {
    let malformed = || DatasetError::Linestring(text.to_string());
    let body = text
        .trim()
        .strip_prefix("LINESTRING")
        .map(str::trim)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(malformed)?;

    let mut points = Vec::new();
    for pair in body.split(',') {
        let mut parts = pair.split_whitespace();
        let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        let lon: f64 = lon.parse().map_err(|_| malformed())?;
        let lat: f64 = lat.parse().map_err(|_| malformed())?;
        points.push(Coordinate::new(lat, lon));
    }
    Ok(points)
}

/// Zero-length segments are skipped; any other failure is returned.
fn segment_rectangles(
    points: &[Coordinate],
    street: &StreetConfig,
) -> Result<Vec<Rectangle>, PlantingError> {
    let mut rectangles = Vec::new();
    for segment in points.windows(2) {
        match street_side_rectangles(
            segment[0],
            segment[1],
            street.offset_meters,
            street.width_meters,
            AreaType::StreetSide,
        ) {
            Ok(pair) => rectangles.extend(pair),
            Err(err @ PlantingError::DegenerateGeometry(_)) => {
                warn!("skipping street segment: {err}")
            }
            Err(err) => return Err(err),
        }
    }
    Ok(rectangles)
}

#[derive(Debug, Deserialize)]
struct StreetRow {
    #[serde(default)]
    shape: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParkingRow {
    #[serde(default)]
    shape: Option<String>,
    #[serde(rename = "PRKG_SPLY", default)]
    supply: Option<f64>,
}

/// Two street-side rectangles per consecutive point pair of every row's
/// `shape` LINESTRING.
pub fn street_rectangles_from_csv<R: std::io::Read>(
    reader: R,
    street: &StreetConfig,
) -> Result<Vec<Rectangle>, DatasetError> {
    street.validate()?;
    let mut table = csv::Reader::from_reader(reader);
    let mut rectangles = Vec::new();
    for (line, row) in table.deserialize::<StreetRow>().enumerate() {
        let Some(shape) = row?.shape.filter(|s| !s.trim().is_empty()) else {
            warn!("row {line}: no shape");
            continue;
        };
        match parse_linestring(&shape) {
            Ok(points) => rectangles.extend(segment_rectangles(&points, street)?),
            Err(err) => warn!("row {line}: {err}"),
        }
    }
    info!("generated {} street-side rectangles", rectangles.len());
    Ok(rectangles)
}

pub fn load_street_segments(
    path: impl AsRef<Path>,
    street: &StreetConfig,
) -> Result<Vec<Rectangle>, DatasetError> {
    street_rectangles_from_csv(fs::File::open(path)?, street)
}

#[derive(Debug, Clone)]
pub struct ParkingRectangles {
    pub rectangles: Vec<Rectangle>,
    pub total_spaces: f64,
}

/// Like [`street_rectangles_from_csv`], restricted to rows with a positive
/// `PRKG_SPLY` parking supply.
pub fn parking_rectangles_from_csv<R: std::io::Read>(
    reader: R,
    street: &StreetConfig,
) -> Result<ParkingRectangles, DatasetError> {
    street.validate()?;
    let mut table = csv::Reader::from_reader(reader);
    let mut rectangles = Vec::new();
    let mut total_spaces = 0.0;
    for (line, row) in table.deserialize::<ParkingRow>().enumerate() {
        let row = row?;
        let Some(shape) = row.shape.filter(|s| s.contains("LINESTRING")) else {
            continue;
        };
        let spaces = match row.supply {
            Some(spaces) if spaces > 0.0 => spaces,
            _ => continue,
        };
        let points = match parse_linestring(&shape) {
            Ok(points) => points,
            Err(err) => {
                warn!("row {line}: {err}");
                continue;
            }
        };
        total_spaces += spaces;
        rectangles.extend(segment_rectangles(&points, street)?);
    }
    info!(
        "processed {total_spaces} parking spaces into {} rectangles",
        rectangles.len()
    );
    Ok(ParkingRectangles {
        rectangles,
        total_spaces,
    })
}

pub fn load_street_parking(
    path: impl AsRef<Path>,
    street: &StreetConfig,
) -> Result<ParkingRectangles, DatasetError> {
    parking_rectangles_from_csv(fs::File::open(path)?, street)
}

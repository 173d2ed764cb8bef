use serde::{Deserialize, Serialize};

use crate::{
    error::{require_positive, PlantingError},
    geodesy::{destination, distance_meters, midpoint, Coordinate},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    ParkingLot,
    Garage,
    Industrial,
    Commercial,
    StreetSide,
}

/// A planting footprint anchored at its north-east corner. It extends
/// `length_meters` south and `width_meters` west of the anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub top_right_latitude: f64,
    pub top_right_longitude: f64,
    pub width_meters: f64,
    pub length_meters: f64,
    pub area_type: AreaType,
}

impl Rectangle {
    pub fn new(
        top_right: Coordinate,
        width_meters: f64,
        length_meters: f64,
        area_type: AreaType,
    ) -> Result<Self, PlantingError> {
        let rectangle = Self {
            top_right_latitude: top_right.latitude,
            top_right_longitude: top_right.longitude,
            width_meters,
            length_meters,
            area_type,
        };
        rectangle.validate()?;
        Ok(rectangle)
    }

    /// Fields are public so records can be built by loaders; samplers call this
    /// before drawing anything.
    pub fn validate(&self) -> Result<(), PlantingError> {
        require_positive("width_meters", self.width_meters)?;
        require_positive("length_meters", self.length_meters)?;
        Ok(())
    }

    pub fn anchor(&self) -> Coordinate {
        Coordinate::new(self.top_right_latitude, self.top_right_longitude)
    }

    pub fn area(&self) -> f64 {
        self.width_meters * self.length_meters
    }
}

/// Build the two planting strips either side of the street segment
/// `coord1 -> coord2`.
///
/// Both strips are as long as the segment and anchored `offset_meters` from its
/// midpoint along the perpendicular. The segment bearing is the planar
/// `atan2(Δlon, Δlat)`, which is adequate at street scale.
pub fn street_side_rectangles(
    coord1: Coordinate,
    coord2: Coordinate,
    offset_meters: f64,
    width_meters: f64,
    area_type: AreaType,
) -> Result<[Rectangle; 2], PlantingError> {
    if coord1 == coord2 {
        return Err(PlantingError::DegenerateGeometry(format!(
            "segment endpoints coincide at ({}, {})",
            coord1.latitude, coord1.longitude
        )));
    }

    let bearing = (coord2.longitude - coord1.longitude)
        .to_radians()
        .atan2((coord2.latitude - coord1.latitude).to_radians());
    let perpendicular = bearing + std::f64::consts::FRAC_PI_2;
    let mid = midpoint(coord1, coord2);
    let length_meters = distance_meters(coord1, coord2);

    let near = destination(mid, offset_meters, perpendicular);
    let far = destination(mid, -offset_meters, perpendicular);

    Ok([
        Rectangle::new(near, width_meters, length_meters, area_type)?,
        Rectangle::new(far, width_meters, length_meters, area_type)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_dimensions() {
        let anchor = Coordinate::new(37.7749, -122.4194);
        assert!(Rectangle::new(anchor, 0.0, 10.0, AreaType::ParkingLot).is_err());
        assert!(Rectangle::new(anchor, 10.0, -2.0, AreaType::ParkingLot).is_err());
        let ok = Rectangle::new(anchor, 10.0, 4.0, AreaType::Garage).unwrap();
        assert_eq!(ok.area(), 40.0);
        assert_eq!(ok.anchor(), anchor);
    }

    #[test]
    fn north_south_segment_produces_east_and_west_strips() {
        let coord1 = Coordinate::new(37.0, -122.0);
        let coord2 = Coordinate::new(37.001, -122.0);
        let [east, west] =
            street_side_rectangles(coord1, coord2, 1.0, 2.0, AreaType::StreetSide).unwrap();

        let length = distance_meters(coord1, coord2);
        assert!((length - 111.0).abs() < 0.5);
        assert_eq!(east.length_meters, length);
        assert_eq!(west.length_meters, length);
        assert_eq!(east.width_meters, 2.0);
        assert_eq!(east.area_type, AreaType::StreetSide);

        let mid = midpoint(coord1, coord2);
        assert!(east.top_right_longitude > mid.longitude);
        assert!(west.top_right_longitude < mid.longitude);
        assert!((distance_meters(mid, east.anchor()) - 1.0).abs() < 1e-6);
        assert!((distance_meters(mid, west.anchor()) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn anchors_reflect_across_the_midpoint() {
        let coord1 = Coordinate::new(37.7601, -122.4350);
        let coord2 = Coordinate::new(37.7612, -122.4331);
        let [a, b] =
            street_side_rectangles(coord1, coord2, 4.0, 3.0, AreaType::StreetSide).unwrap();
        let mid = midpoint(coord1, coord2);
        let reflected = midpoint(a.anchor(), b.anchor());
        assert!(distance_meters(mid, reflected) < 1e-3);
        assert_eq!(a.length_meters, b.length_meters);
    }

    #[test]
    fn coincident_endpoints_are_degenerate() {
        let c = Coordinate::new(37.0, -122.0);
        let err = street_side_rectangles(c, c, 1.0, 1.0, AreaType::StreetSide).unwrap_err();
        assert!(matches!(err, PlantingError::DegenerateGeometry(_)));
    }

    #[test]
    fn area_type_serializes_snake_case() {
        let json = serde_json::to_string(&AreaType::ParkingLot).unwrap();
        assert_eq!(json, "\"parking_lot\"");
    }
}

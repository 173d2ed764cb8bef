//! Points on the Earth's surface and the geodesic operations used to size and
//! place planting rectangles at city scale.
//!
//! Behaviour at the poles and across the antimeridian is undefined; inputs are
//! expected to sit within a single city's bounds.

use geo::{GeodesicDestination, GeodesicDistance, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    // geo stores longitude as x, latitude as y
    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    fn from_point(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

/// Arithmetic mean of the two coordinates. Only meaningful for short segments.
pub fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    Coordinate::new(
        (a.latitude + b.latitude) / 2.0,
        (a.longitude + b.longitude) / 2.0,
    )
}

/// Travel `distance_meters` from `origin` along the WGS84 geodesic starting at
/// `bearing_radians` (clockwise from north). A negative distance travels the
/// opposite way.
pub fn destination(origin: Coordinate, distance_meters: f64, bearing_radians: f64) -> Coordinate {
    let (distance, bearing) = if distance_meters < 0.0 {
        (-distance_meters, bearing_radians + std::f64::consts::PI)
    } else {
        (distance_meters, bearing_radians)
    };
    let reached = origin
        .to_point()
        .geodesic_destination(normalize_degrees(bearing.to_degrees()), distance);
    Coordinate::from_point(reached)
}

/// Geodesic distance on the WGS84 ellipsoid.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    a.to_point().geodesic_distance(&b.to_point())
}

fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

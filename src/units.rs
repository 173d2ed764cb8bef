//! Local tangent-plane conversion between meter offsets and degree deltas.
//!
//! Valid over rectangle-sized extents only (tens to low hundreds of meters).
//! Anything that needs absolute distance accuracy goes through `geodesy`.

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Degrees per meter at `latitude`, as `(lat_factor, lon_factor)`.
///
/// `lon_factor` diverges towards the poles and is undefined at exactly ±90°.
pub fn meters_per_degree(latitude: f64) -> (f64, f64) {
    let meters_per_degree_lat = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
    let lat_factor = 1.0 / meters_per_degree_lat;
    let lon_factor = 1.0 / (meters_per_degree_lat * latitude.to_radians().cos());
    (lat_factor, lon_factor)
}

/// Coordinate of the point `width_offset` meters west and `length_offset`
/// meters south of a north-east anchor.
pub fn offset_from_anchor(
    anchor_latitude: f64,
    anchor_longitude: f64,
    width_offset: f64,
    length_offset: f64,
) -> (f64, f64) {
    let (lat_factor, lon_factor) = meters_per_degree(anchor_latitude);
    (
        anchor_latitude - length_offset * lat_factor,
        anchor_longitude - width_offset * lon_factor,
    )
}

/// Inverse of [`offset_from_anchor`]: `(width_offset, length_offset)` in meters.
pub fn offset_to_anchor(
    anchor_latitude: f64,
    anchor_longitude: f64,
    latitude: f64,
    longitude: f64,
) -> (f64, f64) {
    let (lat_factor, lon_factor) = meters_per_degree(anchor_latitude);
    (
        (anchor_longitude - longitude) / lon_factor,
        (anchor_latitude - latitude) / lat_factor,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitude_factor_is_constant() {
        let (at_equator, _) = meters_per_degree(0.0);
        let (at_sf, _) = meters_per_degree(37.7749);
        assert_eq!(at_equator, at_sf);
        assert!((1.0 / at_equator - 111_194.93).abs() < 0.01);
    }

    #[test]
    fn longitude_factor_grows_with_latitude() {
        let (lat0, lon0) = meters_per_degree(0.0);
        let (_, lon60) = meters_per_degree(60.0);
        assert!((lat0 - lon0).abs() < 1e-18);
        assert!((lon60 / lon0 - 2.0).abs() < 1e-9);
    }

    #[test]
    fn offsets_move_south_and_west() {
        let (lat, lon) = offset_from_anchor(37.7749, -122.4194, 10.0, 10.0);
        assert!(lat < 37.7749);
        assert!(lon < -122.4194);
    }

    #[test]
    fn offset_round_trip() {
        let (lat, lon) = offset_from_anchor(37.7749, -122.4194, 3.25, 7.5);
        let (w, l) = offset_to_anchor(37.7749, -122.4194, lat, lon);
        assert!((w - 3.25).abs() < 1e-6);
        assert!((l - 7.5).abs() < 1e-6);
    }
}

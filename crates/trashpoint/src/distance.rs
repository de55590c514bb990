//! Great-circle distance.

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two `(lat, lon)` points in degrees, in kilometres.
///
/// Inputs are expected to be validated already; non-finite input propagates
/// as `NaN`.
///
/// ```
/// use trashpoint::distance_km;
///
/// // Taipei 101 to Taipei Main Station, roughly 5 km
/// let d = distance_km(25.0340, 121.5645, 25.0478, 121.5170);
/// assert!((d - 5.0).abs() < 0.5);
/// ```
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        assert!(distance_km(25.033, 121.5654, 25.033, 121.5654).abs() < 1e-12);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // 2πR / 360
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!((distance_km(0.0, 0.0, 1.0, 0.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_symmetry() {
        let a = distance_km(25.04, 121.51, 24.99, 121.58);
        let b = distance_km(24.99, 121.58, 25.04, 121.51);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_antipodal_points() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(distance_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }
}

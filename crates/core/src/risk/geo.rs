//! Great-circle distance.

use crate::fingerprint::Coordinates;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Computes the haversine distance between two coordinates, in kilometers.
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELHI: Coordinates = Coordinates {
        latitude: 28.6,
        longitude: 77.2,
    };
    const LONDON: Coordinates = Coordinates {
        latitude: 51.5,
        longitude: -0.1,
    };

    #[test]
    fn test_delhi_london_distance() {
        let d = haversine_km(DELHI, LONDON);
        // Roughly 6700 km.
        assert!((6600.0..6800.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_same_point_is_zero() {
        assert!(haversine_km(DELHI, DELHI).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric() {
        let ab = haversine_km(DELHI, LONDON);
        let ba = haversine_km(LONDON, DELHI);
        assert!((ab - ba).abs() < 1e-9);
    }
}

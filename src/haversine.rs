//! Great-circle distance between coordinates.
//!
//! Used wherever the widget needs "how far apart are these two points on the
//! ground": snapping a touched point to the route line, deciding whether a
//! waypoint is detached from the route, and accepting reverse-geocoding hits.

use crate::waypoint::LatLng;

/// Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates in metres.
pub fn distance_m(from: LatLng, to: LatLng) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Index of the coordinate in `points` closest to `target`.
///
/// Linear scan; ties resolve to the lowest index. Returns `None` for an
/// empty slice.
pub fn closest_index(points: &[LatLng], target: LatLng) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, point) in points.iter().enumerate() {
        let dist = distance_m(*point, target);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((index, dist)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point() {
        let p = LatLng::new(36.1, -115.1);
        assert!(distance_m(p, p) < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_known_distance() {
        // Las Vegas to Los Angeles is roughly 370 km
        let dist = distance_m(LatLng::new(36.17, -115.14), LatLng::new(34.05, -118.24));
        assert!(
            dist > 350_000.0 && dist < 400_000.0,
            "LV to LA should be ~370km, got {}",
            dist
        );
    }

    #[test]
    fn test_symmetric() {
        let a = LatLng::new(57.7, 11.9);
        let b = LatLng::new(57.8, 12.0);
        assert!((distance_m(a, b) - distance_m(b, a)).abs() < 1e-6);
    }

    #[test]
    fn test_closest_index_prefers_first_on_tie() {
        let points = vec![
            LatLng::new(0.0, 1.0),
            LatLng::new(0.0, -1.0),
            LatLng::new(5.0, 5.0),
        ];
        assert_eq!(closest_index(&points, LatLng::new(0.0, 0.0)), Some(0));
        assert_eq!(closest_index(&points, LatLng::new(4.0, 4.0)), Some(2));
        assert_eq!(closest_index(&[], LatLng::new(0.0, 0.0)), None);
    }
}

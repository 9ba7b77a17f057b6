//! Polyline representation for route geometries.
//!
//! The routing service ships step geometries as encoded polylines: signed,
//! delta-encoded coordinates written as 5-bit chunks offset into printable
//! ASCII. Decoding happens at the boundary when the response is converted;
//! everything downstream works on the decoded [`Polyline`].

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::error::PolylineError;
use crate::waypoint::LatLng;

/// Precision used by the OSRM route service unless configured otherwise.
pub const DEFAULT_PRECISION: u32 = 5;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<LatLng>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<LatLng>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<LatLng> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Encodes the polyline at the given decimal precision.
    pub fn encode(&self, precision: u32) -> Result<String, PolylineError> {
        encode(&self.points, precision)
    }
}

/// Encodes coordinates at `precision` decimal places.
pub fn encode(points: &[LatLng], precision: u32) -> Result<String, PolylineError> {
    let coords = points.iter().map(|point| Coord {
        x: point.lng,
        y: point.lat,
    });
    ::polyline::encode_coordinates(coords, precision)
        .map_err(|err| PolylineError::Malformed(err.to_string()))
}

/// Decodes an encoded polyline string at `precision` decimal places.
///
/// Points outside the valid latitude/longitude ranges are rejected, so a
/// corrupt geometry never reaches the route.
pub fn decode(encoded: &str, precision: u32) -> Result<Polyline, PolylineError> {
    let line = ::polyline::decode_polyline(encoded, precision)
        .map_err(|err| PolylineError::Malformed(err.to_string()))?;

    let points = line
        .coords()
        .map(|coord| {
            if (-90.0..=90.0).contains(&coord.y) && (-180.0..=180.0).contains(&coord.x) {
                Ok(LatLng::new(coord.y, coord.x))
            } else {
                Err(PolylineError::OutOfRange {
                    lat: coord.y,
                    lng: coord.x,
                })
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polyline::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<LatLng> {
        vec![
            LatLng::new(38.5, -120.2),
            LatLng::new(40.7, -120.95),
            LatLng::new(43.252, -126.453),
        ]
    }

    #[test]
    fn test_new_and_points() {
        let polyline = Polyline::new(sample_points());
        assert_eq!(polyline.points(), &sample_points()[..]);
        assert_eq!(polyline.len(), 3);
    }

    #[test]
    fn test_into_points() {
        let owned = Polyline::new(sample_points()).into_points();
        assert_eq!(owned, sample_points());
    }

    #[test]
    fn test_encode_reference_string() {
        assert_eq!(
            encode(&sample_points(), 5).as_deref(),
            Ok("_p~iF~ps|U_ulLnnqC_mqNvxq`@")
        );
    }

    #[test]
    fn test_decode_reference_string() {
        let decoded = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@", 5).expect("valid polyline");
        for (got, want) in decoded.points().iter().zip(sample_points()) {
            assert!((got.lat - want.lat).abs() < 1e-9);
            assert!((got.lng - want.lng).abs() < 1e-9);
        }
    }

    #[test]
    fn test_roundtrip_within_precision() {
        let points = vec![
            LatLng::new(57.740_123_4, 11.943_987_6),
            LatLng::new(-33.868_819_9, 151.209_295_1),
            LatLng::new(0.000_004_9, -0.000_005_1),
        ];
        for precision in [5, 6] {
            let tolerance = 0.5 * 10f64.powi(-(precision as i32)) + 1e-12;
            let encoded = encode(&points, precision).expect("valid coordinates");
            let decoded = decode(&encoded, precision).expect("roundtrip");
            assert_eq!(decoded.len(), points.len());
            for (got, want) in decoded.points().iter().zip(&points) {
                assert!((got.lat - want.lat).abs() <= tolerance);
                assert!((got.lng - want.lng).abs() <= tolerance);
            }
        }
    }

    #[test]
    fn test_empty_polyline() {
        assert!(decode("", 5).expect("empty is valid").is_empty());
        assert_eq!(encode(&[], 5).as_deref(), Ok(""));
    }

    #[test]
    fn test_truncated_input() {
        // The first character has the continuation bit set and nothing follows.
        assert!(matches!(decode("_", 5), Err(PolylineError::Malformed(_))));
    }

    #[test]
    fn test_invalid_character() {
        assert!(matches!(decode("_p~iF ", 5), Err(PolylineError::Malformed(_))));
    }

    #[test]
    fn test_oversized_values_are_rejected() {
        let result = std::panic::catch_unwind(|| decode("}~~~~~~~~~~~N?}~~~~~~~~~~~N?", 5));
        let decoded = result.expect("decoding never panics");
        assert!(decoded.is_err(), "{:?}", decoded);
    }

    #[test]
    fn test_encode_rejects_invalid_latitude() {
        let err = encode(&[LatLng::new(91.0, 0.0)], 5).unwrap_err();
        assert!(matches!(err, PolylineError::Malformed(_)));
    }
}

//! Real Berlin locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use route_control::waypoint::LatLng;

// ============================================================================
// Friedrichstraße, south to north
// ============================================================================

pub const CHECKPOINT_CHARLIE: LatLng = LatLng::new(52.50753, 13.39039);
pub const FRIEDRICHSTRASSE_STATION: LatLng = LatLng::new(52.52023, 13.38715);
pub const ORANIENBURGER_TOR: LatLng = LatLng::new(52.52781, 13.38713);

// ============================================================================
// Landmarks
// ============================================================================

pub const BRANDENBURG_GATE: LatLng = LatLng::new(52.51628, 13.37770);
pub const ALEXANDERPLATZ: LatLng = LatLng::new(52.52192, 13.41321);
pub const POTSDAMER_PLATZ: LatLng = LatLng::new(52.50965, 13.37632);

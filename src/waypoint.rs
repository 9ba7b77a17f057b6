//! Waypoints: the user-specified stops of a planned route.

use serde::{Deserialize, Serialize};

use crate::haversine;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_to(&self, other: LatLng) -> f64 {
        haversine::distance_m(*self, other)
    }
}

/// Per-waypoint routing options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypointOptions {
    pub allow_u_turn: bool,
}

/// A stop on the planned route.
///
/// The position may be unset while the waypoint waits for geocoding. A
/// waypoint has no identity of its own: it is addressed by its index in the
/// plan, so splicing shifts every waypoint after the splice point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Option<LatLng>,
    pub name: String,
    pub options: WaypointOptions,
}

impl Waypoint {
    pub fn new(
        position: Option<LatLng>,
        name: impl Into<String>,
        options: WaypointOptions,
    ) -> Self {
        Self {
            position,
            name: name.into(),
            options,
        }
    }

    /// A placeholder waypoint with neither position nor name.
    pub fn empty() -> Self {
        Self::default()
    }

    /// An unnamed waypoint at `position`.
    pub fn at(position: LatLng) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn is_positioned(&self) -> bool {
        self.position.is_some()
    }
}

impl From<LatLng> for Waypoint {
    fn from(position: LatLng) -> Self {
        Self::at(position)
    }
}

/// Display name derived from a coordinate, e.g. `N52.52, E13.405`.
///
/// Used when no geocoder is configured or geocoding did not produce an
/// acceptable match.
pub fn fallback_name(position: LatLng) -> String {
    let ns = if position.lat < 0.0 { 'S' } else { 'N' };
    let ew = if position.lng < 0.0 { 'W' } else { 'E' };
    format!(
        "{}{}, {}{}",
        ns,
        round4(position.lat.abs()),
        ew,
        round4(position.lng.abs())
    )
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

//! Parsed routes and their turn instructions.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::waypoint::{LatLng, Waypoint};

/// Total length and duration of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Metres.
    pub total_distance: f64,
    /// Seconds.
    pub total_time: f64,
}

/// A candidate route returned by a [`crate::traits::Router`].
///
/// Routes are snapshots: a waypoint change produces a whole new set of routes
/// rather than patching an existing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub name: String,
    pub coordinates: Vec<LatLng>,
    pub instructions: Vec<Instruction>,
    pub summary: Summary,
    /// `waypoint_indices[i]` is the index into `coordinates` where the i-th
    /// input waypoint is matched. Empty when the service returned no steps.
    pub waypoint_indices: Vec<usize>,
    /// The waypoints the route was requested for.
    pub input_waypoints: Vec<Waypoint>,
    /// The input waypoints snapped onto the road network by the service.
    pub waypoints: Vec<Waypoint>,
    /// Position of this route in the response it came from.
    pub routes_index: usize,
    /// True when the geometry is the service's simplified overview.
    pub is_simplified: bool,
}

impl Route {
    /// South-west and north-east corners of the route geometry.
    pub fn bounds(&self) -> Option<(LatLng, LatLng)> {
        let first = self.coordinates.first()?;
        let (mut sw, mut ne) = (*first, *first);
        for c in &self.coordinates {
            sw.lat = sw.lat.min(c.lat);
            sw.lng = sw.lng.min(c.lng);
            ne.lat = ne.lat.max(c.lat);
            ne.lng = ne.lng.max(c.lng);
        }
        Some((sw, ne))
    }
}

/// Normalised instruction type derived from the service's maneuver vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstructionType {
    Head,
    Continue,
    WaypointReached,
    DestinationReached,
    Roundabout,
    Merge,
    Fork,
    OnRamp,
    OffRamp,
    EndOfRoad,
    Straight,
    SlightRight,
    Right,
    SharpRight,
    Uturn,
    SharpLeft,
    Left,
    SlightLeft,
}

impl From<Modifier> for InstructionType {
    fn from(modifier: Modifier) -> Self {
        match modifier {
            Modifier::Uturn => Self::Uturn,
            Modifier::SharpRight => Self::SharpRight,
            Modifier::Right => Self::Right,
            Modifier::SlightRight => Self::SlightRight,
            Modifier::Straight => Self::Straight,
            Modifier::SlightLeft => Self::SlightLeft,
            Modifier::Left => Self::Left,
            Modifier::SharpLeft => Self::SharpLeft,
        }
    }
}

/// Turn direction qualifier of a maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Uturn,
    SharpRight,
    Right,
    SlightRight,
    Straight,
    SlightLeft,
    Left,
    SharpLeft,
}

impl Modifier {
    /// Parses the service's modifier vocabulary (`"slight left"`, `"uturn"`...).
    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "uturn" => Self::Uturn,
            "sharp right" => Self::SharpRight,
            "right" => Self::Right,
            "slight right" => Self::SlightRight,
            "straight" => Self::Straight,
            "slight left" => Self::SlightLeft,
            "left" => Self::Left,
            "sharp left" => Self::SharpLeft,
            _ => return None,
        })
    }

    /// Collapses the modifier to plain left or right.
    pub fn left_or_right(raw: &str) -> Self {
        if raw.contains("left") {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Eight-way compass point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassPoint {
    const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Compass point for `bearing` (degrees clockwise from north).
    ///
    /// Each point owns the 45° sector starting at it, lower bound inclusive:
    /// `[0, 45)` is north, `[45, 90)` north-east, and so on.
    pub fn from_bearing(bearing: f64) -> Self {
        let normalized = bearing.rem_euclid(360.0);
        let octant = ((normalized / 45.0).floor() as usize) % 8;
        Self::ALL[octant]
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        };
        f.write_str(s)
    }
}

/// One turn instruction of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub instruction_type: InstructionType,
    pub modifier: Option<Modifier>,
    /// Metres.
    pub distance: f64,
    /// Seconds.
    pub time: f64,
    pub road: String,
    pub direction: Option<CompassPoint>,
    pub exit: Option<u32>,
    /// Index into [`Route::coordinates`] where the maneuver takes place.
    pub index: usize,
    pub mode: String,
    /// Localised sentence, when the router compiles one.
    pub text: Option<String>,
}

/// Cancellation flag shared between a request and whoever issued it.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-request routing options.
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Only the geometry is needed (drag previews): no steps, no alternatives.
    pub geometry_only: bool,
    /// With `geometry_only`, let the service simplify the overview geometry.
    pub simplify_geometry: bool,
    /// Relax the service's preference for continuing straight at waypoints.
    pub allow_u_turns: bool,
    /// Map zoom level, forwarded to routers that use it.
    pub zoom: Option<u8>,
    pub abort: AbortHandle,
}

//! route-control
//!
//! Headless routing widget for interactive maps: a waypoint plan with
//! draggable markers, an OSRM route client, localised turn instructions and
//! the route line and itinerary a host draws.

pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod formatter;
pub mod haversine;
pub mod itinerary;
pub mod line;
pub mod osrm;
pub mod osrm_response;
pub mod plan;
pub mod polyline;
pub mod route;
pub mod text;
pub mod traits;
pub mod waypoint;

pub use config::RoutingConfig;
pub use control::{ControlEvent, ControlOptions, RoutingControl, WaypointMode};
pub use error::RoutingError;
pub use osrm::{OsrmClient, OsrmConfig};
pub use plan::{Plan, PlanEvent, PlanOptions};
pub use route::{Instruction, InstructionType, Route, RouteOptions};
pub use traits::{Geocoder, GeocodingResult, Router};
pub use waypoint::{LatLng, Waypoint};

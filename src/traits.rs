//! Collaborator seams of the routing widget.
//!
//! The widget never computes routes or geocodes by itself. Concrete hosts
//! implement these traits (or use [`crate::osrm::OsrmClient`]) and hand them
//! to the plan and control.

use crate::error::{GeocodeError, RoutingError};
use crate::route::{Route, RouteOptions};
use crate::waypoint::{LatLng, Waypoint};

/// Computes candidate routes through an ordered list of waypoints.
///
/// The first route is the preferred one; any further routes are alternatives.
/// Implementations must check `options.abort` and return
/// [`RoutingError::Aborted`] once it is set.
pub trait Router {
    fn route(&self, waypoints: &[Waypoint], options: &RouteOptions)
        -> Result<Vec<Route>, RoutingError>;
}

/// A single geocoding match.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingResult {
    pub name: String,
    pub center: LatLng,
}

/// Forward and reverse geocoding.
pub trait Geocoder {
    /// Looks up places matching `query`, best match first.
    fn geocode(&self, query: &str) -> Result<Vec<GeocodingResult>, GeocodeError>;

    /// Looks up places near `position`, best match first.
    fn reverse(&self, position: LatLng) -> Result<Vec<GeocodingResult>, GeocodeError>;
}

impl<R: Router + ?Sized> Router for Box<R> {
    fn route(
        &self,
        waypoints: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RoutingError> {
        (**self).route(waypoints, options)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for Box<G> {
    fn geocode(&self, query: &str) -> Result<Vec<GeocodingResult>, GeocodeError> {
        (**self).geocode(query)
    }

    fn reverse(&self, position: LatLng) -> Result<Vec<GeocodingResult>, GeocodeError> {
        (**self).reverse(position)
    }
}

//! OSRM API response types for the Route service.
//!
//! Only the fields the widget consumes are modelled; everything else in the
//! payload is ignored by serde.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::{Deserialize, Serialize};

/// Code the service uses for a successful response.
pub const CODE_OK: &str = "Ok";

/// OSRM Route API response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM, `"Ok"` on success.
    ///
    /// Other values include `"NoRoute"`, `"NoSegment"`, `"InvalidQuery"`
    /// and `"TooBig"`.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    #[serde(default)]
    pub waypoints: Vec<ResponseWaypoint>,

    #[serde(default)]
    pub routes: Vec<ResponseRoute>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

/// An input coordinate snapped to the road network.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseWaypoint {
    /// `[lng, lat]`.
    pub location: [f64; 2],
    #[serde(default)]
    pub name: String,
    /// Opaque token that lets a follow-up request snap to the same edge.
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseRoute {
    pub distance: f64,
    pub duration: f64,
    /// Overview geometry, present when requested with `overview=full` or
    /// `overview=simplified`.
    pub geometry: Option<String>,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One maneuver of a leg.
///
/// Also the input of [`crate::text::TextInstructions::compile`], which is why
/// it can be built and serialised directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub geometry: String,
    pub maneuver: Option<Maneuver>,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub mode: String,
    pub driving_side: Option<String>,
    pub destinations: Option<String>,
    pub exits: Option<String>,
    pub rotary_name: Option<String>,
    pub junction_name: Option<String>,
    #[serde(default)]
    pub intersections: Vec<Intersection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    #[serde(rename = "type")]
    pub maneuver_type: Option<String>,
    pub modifier: Option<String>,
    pub bearing_after: Option<f64>,
    pub exit: Option<u32>,
    /// `[lng, lat]`.
    pub location: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub lanes: Option<Vec<Lane>>,
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub valid: bool,
    #[serde(default)]
    pub indications: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "waypoints": [
                {"location": [13.388, 52.517], "name": "Friedrichstraße", "hint": "abc"},
                {"location": [13.397, 52.529], "name": "Torstraße", "hint": "def"}
            ],
            "routes": [{
                "distance": 1886.3,
                "duration": 251.5,
                "legs": [{
                    "summary": "Friedrichstraße, Torstraße",
                    "steps": [{
                        "geometry": "mfp_I__vpA",
                        "maneuver": {"type": "depart", "bearing_after": 0, "location": [13.388, 52.517]},
                        "distance": 10.0,
                        "duration": 2.0,
                        "name": "Friedrichstraße",
                        "ref": "B 96",
                        "mode": "driving",
                        "intersections": [{"lanes": [{"valid": true, "indications": ["left"]}], "classes": ["motorway"]}]
                    }]
                }]
            }]
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert_eq!(response.waypoints.len(), 2);
        assert_eq!(response.waypoints[0].hint.as_deref(), Some("abc"));
        let step = &response.routes[0].legs[0].steps[0];
        assert_eq!(step.reference.as_deref(), Some("B 96"));
        let maneuver = step.maneuver.as_ref().expect("maneuver");
        assert_eq!(maneuver.maneuver_type.as_deref(), Some("depart"));
        assert_eq!(maneuver.bearing_after, Some(0.0));
        assert_eq!(step.intersections[0].classes, vec!["motorway".to_string()]);
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{
            "code": "NoRoute",
            "message": "Impossible route between points"
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert_eq!(
            response.message,
            Some("Impossible route between points".to_string())
        );
        assert!(response.routes.is_empty());
    }
}

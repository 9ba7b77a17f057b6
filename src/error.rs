//! Error types.

use thiserror::Error;

/// Status reported for transport failures and timeouts.
pub const STATUS_TRANSPORT: i32 = -1;
/// Status reported when the service payload cannot be parsed.
pub const STATUS_PARSE: i32 = -2;
/// Status reported when a parsed payload cannot be converted into routes.
pub const STATUS_PROCESSING: i32 = -3;

/// Errors from [`crate::traits::Router::route`].
///
/// Client-side failures carry a negative status (see [`RoutingError::status`]),
/// the service's own rejections carry the service's code string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No response arrived within the configured timeout.
    #[error("OSRM request timed out.")]
    Timeout,

    /// The request could not be delivered or the connection failed.
    #[error("HTTP request failed: {message}")]
    Transport { message: String },

    /// The response body was not valid service JSON.
    #[error("Error parsing OSRM response: {message}")]
    Parse { message: String },

    /// The response parsed but could not be turned into routes.
    #[error("Error processing OSRM response: {message}")]
    Processing { message: String },

    /// The service answered with a code other than `Ok`.
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    /// The request was cancelled because a newer one superseded it.
    #[error("request aborted")]
    Aborted,

    /// Routing needs at least two waypoints with a position.
    #[error("at least two positioned waypoints are required")]
    NotReady,
}

impl RoutingError {
    /// Negative client-side status, or `None` for service rejections.
    pub fn status(&self) -> Option<i32> {
        match self {
            Self::Timeout | Self::Transport { .. } | Self::Aborted | Self::NotReady => {
                Some(STATUS_TRANSPORT)
            }
            Self::Parse { .. } => Some(STATUS_PARSE),
            Self::Processing { .. } => Some(STATUS_PROCESSING),
            Self::Service { .. } => None,
        }
    }

    /// The service's own response code, for service rejections.
    pub fn service_code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Aborts are cancellations, not failures, and are never reported.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Errors from [`crate::polyline`] encoding and decoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolylineError {
    #[error("malformed polyline: {0}")]
    Malformed(String),

    #[error("polyline point ({lat}, {lng}) is out of range")]
    OutOfRange { lat: f64, lng: f64 },
}

/// Errors from compiling a turn instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TextError {
    #[error("no instructions for language {0:?}")]
    UnknownLanguage(String),

    #[error("language table {language:?} is malformed: {message}")]
    InvalidLanguage { language: String, message: String },

    #[error("step maneuver has no type")]
    MissingType,

    #[error("step maneuver {maneuver_type:?} has no modifier")]
    MissingModifier { maneuver_type: String },

    #[error("\"use lane\" step has no lane information")]
    MissingLanes,

    #[error("bearing {0} is outside 0..=360")]
    InvalidBearing(i64),
}

/// Errors from a [`crate::traits::Geocoder`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("geocoding service failed: {0}")]
    Service(String),
}

/// Errors from loading a [`crate::config::RoutingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid routing configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Language(#[from] TextError),
}

//! Aggregate configuration, loadable from JSON.

use serde::Deserialize;

use crate::control::ControlOptions;
use crate::error::ConfigError;
use crate::formatter::FormatterOptions;
use crate::osrm::OsrmConfig;
use crate::plan::PlanOptions;

/// Every option of the widget. Missing sections and fields take their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub osrm: OsrmConfig,
    pub plan: PlanOptions,
    pub control: ControlOptions,
    pub formatter: FormatterOptions,
}

impl RoutingConfig {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::WaypointMode;
    use crate::formatter::Units;

    #[test]
    fn test_empty_object_is_default() {
        let config = RoutingConfig::from_json("{}").expect("valid");
        assert_eq!(config, RoutingConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = RoutingConfig::from_json(
            r#"{
                "osrm": {"service_url": "http://localhost:5000/route/v1", "exclude": ["toll"]},
                "control": {"waypoint_mode": "snap", "route_drag_interval_ms": 250},
                "formatter": {"units": "imperial"}
            }"#,
        )
        .expect("valid");

        assert_eq!(config.osrm.service_url, "http://localhost:5000/route/v1");
        assert_eq!(config.osrm.profile, "driving");
        assert_eq!(config.osrm.exclude, vec!["toll".to_string()]);
        assert_eq!(config.control.waypoint_mode, WaypointMode::Snap);
        assert_eq!(config.control.route_drag_interval_ms, 250);
        assert!(config.control.auto_route);
        assert_eq!(config.formatter.units, Units::Imperial);
        assert_eq!(config.plan.max_geocoder_tolerance_m, 200.0);
    }

    #[test]
    fn test_invalid_json() {
        let err = RoutingConfig::from_json(r#"{"control": {"waypoint_mode": "teleport"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}

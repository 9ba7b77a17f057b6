//! OSRM HTTP adapter for the route service.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ConfigError, RoutingError};
use crate::osrm_response::{ResponseRoute, ResponseWaypoint, RouteResponse, Step};
use crate::polyline;
use crate::route::{
    CompassPoint, Instruction, InstructionType, Modifier, Route, RouteOptions, Summary,
};
use crate::text::{CompileOptions, Language, TextInstructions};
use crate::traits::Router;
use crate::waypoint::{LatLng, Waypoint};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    /// Route service root, without the profile.
    pub service_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    pub polyline_precision: u32,
    /// Send the hints of the previous response along with the coordinates.
    pub use_hints: bool,
    /// Language of the compiled instruction text.
    pub language: String,
    /// Road classes to avoid, e.g. `toll` or `ferry`.
    pub exclude: Vec<String>,
    pub user_agent: Option<String>,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            service_url: "https://router.project-osrm.org/route/v1".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 30,
            polyline_precision: polyline::DEFAULT_PRECISION,
            use_hints: true,
            language: "en".to_string(),
            exclude: Vec::new(),
            user_agent: None,
        }
    }
}

#[derive(Debug)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
    text: TextInstructions,
    /// Hint per input location, keyed by [`hint_key`].
    hints: Mutex<HashMap<String, String>>,
}

impl OsrmClient {
    /// Client compiling instructions in the configured built-in language.
    pub fn new(config: OsrmConfig) -> Result<Self, ConfigError> {
        let language = Language::builtin(&config.language)?;
        Self::with_language(config, language)
    }

    /// Client compiling instructions with an explicitly supplied language.
    pub fn with_language(config: OsrmConfig, language: Language) -> Result<Self, ConfigError> {
        let mut builder =
            reqwest::blocking::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        let client = builder.build()?;

        Ok(Self {
            config,
            client,
            text: TextInstructions::new(language),
            hints: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    pub fn text_instructions(&self) -> &TextInstructions {
        &self.text
    }

    /// Request URL for `waypoints`, including any cached hints.
    pub fn build_url(&self, waypoints: &[Waypoint], options: &RouteOptions) -> String {
        let mut locations = Vec::with_capacity(waypoints.len());
        let mut hints = Vec::with_capacity(waypoints.len());
        {
            let cache = self.hints.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            for position in waypoints.iter().filter_map(|wp| wp.position) {
                locations.push(format!("{},{}", round6(position.lng), round6(position.lat)));
                hints.push(cache.get(&hint_key(position)).cloned().unwrap_or_default());
            }
        }

        let mut query = Vec::new();
        if options.geometry_only {
            if !options.simplify_geometry {
                query.push("overview=full".to_string());
            }
            query.push("alternatives=false".to_string());
            query.push("steps=false".to_string());
        } else {
            query.push("overview=false".to_string());
            query.push("alternatives=true".to_string());
            query.push("steps=true".to_string());
        }
        if self.config.use_hints && hints.iter().any(|h| !h.is_empty()) {
            query.push(format!("hints={}", hints.join(";")));
        }
        if options.allow_u_turns {
            query.push("continue_straight=false".to_string());
        }
        if !self.config.exclude.is_empty() {
            query.push(format!("exclude={}", self.config.exclude.join(",")));
        }

        format!(
            "{}/{}/{}?{}",
            self.config.service_url.trim_end_matches('/'),
            self.config.profile,
            locations.join(";"),
            query.join("&")
        )
    }

    fn fetch(&self, url: &str) -> Result<RouteResponse, RoutingError> {
        let response = self.client.get(url).send().map_err(transport_error)?;
        let status = response.status();
        let body = response.text().map_err(transport_error)?;

        match serde_json::from_str::<RouteResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(RoutingError::Transport {
                message: format!("HTTP status {}", status),
            }),
            Err(err) => Err(RoutingError::Parse {
                message: err.to_string(),
            }),
        }
    }

    /// Converts a parsed service response into routes.
    ///
    /// `input` must be the waypoints the request was built from.
    pub fn convert_response(
        &self,
        response: RouteResponse,
        input: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RoutingError> {
        if !response.is_ok() {
            return Err(RoutingError::Service {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        self.save_hints(&response.waypoints, input);
        let snapped = snapped_waypoints(input, &response.waypoints);

        response
            .routes
            .iter()
            .enumerate()
            .map(|(routes_index, route)| {
                let mut converted = self.convert_route(route, input, options)?;
                converted.routes_index = routes_index;
                converted.waypoints = snapped.clone();
                Ok(converted)
            })
            .collect()
    }

    fn convert_route(
        &self,
        route: &ResponseRoute,
        input: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<Route, RoutingError> {
        let precision = self.config.polyline_precision;
        let leg_count = route.legs.len();
        let mut coordinates = Vec::new();
        let mut instructions = Vec::new();
        let mut waypoint_indices = Vec::new();
        let mut has_steps = false;

        for (leg_index, leg) in route.legs.iter().enumerate() {
            let last_leg = leg_index + 1 == leg_count;
            for step in &leg.steps {
                has_steps = true;
                let geometry =
                    polyline::decode(&step.geometry, precision).map_err(processing_error)?;
                let index = coordinates.len();
                let raw_type = step
                    .maneuver
                    .as_ref()
                    .and_then(|m| m.maneuver_type.as_deref())
                    .unwrap_or_default();

                if let Some(instruction) =
                    self.convert_step(step, leg_index, leg_count, last_leg, index, input)
                {
                    if (leg_index == 0 && raw_type == "depart") || raw_type == "arrive" {
                        waypoint_indices.push(index);
                    }
                    instructions.push(instruction);
                }
                coordinates.extend(geometry.into_points());
            }
        }

        if !has_steps {
            let overview = route.geometry.as_deref().ok_or_else(|| RoutingError::Processing {
                message: "route has neither steps nor geometry".to_string(),
            })?;
            coordinates = polyline::decode(overview, precision)
                .map_err(processing_error)?
                .into_points();
        }

        let name = route
            .legs
            .iter()
            .map(|leg| capitalize(&leg.summary))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(Route {
            name,
            coordinates,
            instructions,
            summary: Summary {
                total_distance: route.distance,
                total_time: route.duration,
            },
            waypoint_indices,
            input_waypoints: input.to_vec(),
            waypoints: Vec::new(),
            routes_index: 0,
            is_simplified: options.geometry_only && options.simplify_geometry,
        })
    }

    fn convert_step(
        &self,
        step: &Step,
        leg_index: usize,
        leg_count: usize,
        last_leg: bool,
        index: usize,
        input: &[Waypoint],
    ) -> Option<Instruction> {
        let maneuver = step.maneuver.as_ref()?;
        let raw_type = maneuver.maneuver_type.as_deref().unwrap_or_default();
        let raw_modifier = maneuver.modifier.as_deref();
        let instruction_type = instruction_type(raw_type, raw_modifier, last_leg)?;

        let modifier = match raw_type {
            "merge" | "fork" | "on ramp" | "off ramp" | "end of road" => {
                raw_modifier.map(Modifier::left_or_right)
            }
            _ => raw_modifier.and_then(Modifier::parse),
        };

        let waypoint_name = if raw_type == "arrive" {
            input
                .get(leg_index + 1)
                .map(|wp| wp.name.clone())
                .filter(|name| !name.is_empty())
        } else {
            None
        };
        let compile_options = CompileOptions {
            leg_index: Some(leg_index),
            leg_count,
            classes: step
                .intersections
                .first()
                .map(|i| i.classes.clone())
                .unwrap_or_default(),
            waypoint_name,
        };
        let text = match self.text.compile(step, &compile_options) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(maneuver = raw_type, error = %err, "could not compile instruction text");
                None
            }
        };

        Some(Instruction {
            instruction_type,
            modifier,
            distance: step.distance,
            time: step.duration,
            road: step.name.clone(),
            direction: maneuver.bearing_after.map(CompassPoint::from_bearing),
            exit: maneuver.exit,
            index,
            mode: step.mode.clone(),
            text,
        })
    }

    /// Replaces the cached hints with those of the latest response.
    fn save_hints(&self, snapped: &[ResponseWaypoint], input: &[Waypoint]) {
        let mut cache = self.hints.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        cache.clear();
        let positions = input.iter().filter_map(|wp| wp.position);
        for (position, waypoint) in positions.zip(snapped) {
            if let Some(hint) = &waypoint.hint {
                cache.insert(hint_key(position), hint.clone());
            }
        }
    }
}

impl Router for OsrmClient {
    fn route(
        &self,
        waypoints: &[Waypoint],
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RoutingError> {
        if waypoints.iter().filter(|wp| wp.is_positioned()).count() < 2 {
            return Err(RoutingError::NotReady);
        }
        if options.abort.is_aborted() {
            return Err(RoutingError::Aborted);
        }

        let url = self.build_url(waypoints, options);
        debug!(%url, "requesting route");
        let response = self.fetch(&url);

        if options.abort.is_aborted() {
            debug!(%url, "discarding response of aborted request");
            return Err(RoutingError::Aborted);
        }

        let routes =
            response.and_then(|response| self.convert_response(response, waypoints, options));
        match &routes {
            Ok(routes) => debug!(count = routes.len(), "routes received"),
            Err(err) => warn!(error = %err, "routing failed"),
        }
        routes
    }
}

/// Maps the service's maneuver vocabulary to an instruction type.
///
/// Unknown maneuvers take their type from the modifier and are dropped when
/// they have none.
pub fn instruction_type(
    maneuver_type: &str,
    modifier: Option<&str>,
    last_leg: bool,
) -> Option<InstructionType> {
    Some(match maneuver_type {
        "new name" => InstructionType::Continue,
        "depart" => InstructionType::Head,
        "arrive" if last_leg => InstructionType::DestinationReached,
        "arrive" => InstructionType::WaypointReached,
        "roundabout" | "rotary" => InstructionType::Roundabout,
        "merge" => InstructionType::Merge,
        "fork" => InstructionType::Fork,
        "on ramp" => InstructionType::OnRamp,
        "off ramp" => InstructionType::OffRamp,
        "end of road" => InstructionType::EndOfRoad,
        _ => return modifier.and_then(Modifier::parse).map(InstructionType::from),
    })
}

/// Cache key of an input location.
pub fn hint_key(position: LatLng) -> String {
    format!("{:.5},{:.5}", position.lat, position.lng)
}

fn snapped_waypoints(input: &[Waypoint], snapped: &[ResponseWaypoint]) -> Vec<Waypoint> {
    input
        .iter()
        .filter(|wp| wp.is_positioned())
        .zip(snapped)
        .map(|(original, snapped)| {
            let [lng, lat] = snapped.location;
            Waypoint::new(Some(LatLng::new(lat, lng)), original.name.clone(), original.options)
        })
        .collect()
}

fn transport_error(err: reqwest::Error) -> RoutingError {
    if err.is_timeout() {
        RoutingError::Timeout
    } else {
        RoutingError::Transport {
            message: err.to_string(),
        }
    }
}

fn processing_error(err: impl std::fmt::Display) -> RoutingError {
    RoutingError::Processing {
        message: err.to_string(),
    }
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

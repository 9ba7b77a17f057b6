//! Route line: the drawable representation of a route.
//!
//! A [`RouteLine`] is plain data. The host draws each [`LineSegment`] with its
//! style and forwards pointer hits on touchable segments to
//! [`RouteLine::touch`], which works out where a new waypoint belongs.

use serde::{Deserialize, Serialize};

use crate::haversine;
use crate::route::Route;
use crate::waypoint::LatLng;

/// Stroke style of one pass of a line.
///
/// Lines are drawn as several stacked passes, widest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineStyle {
    pub color: String,
    pub opacity: f64,
    pub weight: f64,
    pub dash_array: Option<String>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::new("black", 1.0, 2.0)
    }
}

impl LineStyle {
    pub fn new(color: &str, opacity: f64, weight: f64) -> Self {
        Self {
            color: color.to_string(),
            opacity,
            weight,
            dash_array: None,
        }
    }

    pub fn dashed(mut self, dash_array: &str) -> Self {
        self.dash_array = Some(dash_array.to_string());
        self
    }
}

/// Casing, fill and centre stroke of the main route.
pub fn route_styles() -> Vec<LineStyle> {
    vec![
        LineStyle::new("black", 0.15, 9.0),
        LineStyle::new("white", 0.8, 6.0),
        LineStyle::new("red", 1.0, 2.0),
    ]
}

pub fn alternative_styles() -> Vec<LineStyle> {
    vec![
        LineStyle::new("black", 0.15, 9.0),
        LineStyle::new("white", 0.8, 6.0),
        LineStyle::new("blue", 0.5, 2.0),
    ]
}

pub fn missing_route_styles() -> Vec<LineStyle> {
    vec![
        LineStyle::new("black", 0.15, 7.0),
        LineStyle::new("white", 0.6, 4.0),
        LineStyle::new("gray", 0.8, 2.0).dashed("7,12"),
    ]
}

/// Styles of the temporary lines shown while a new waypoint is dragged.
pub fn drag_styles() -> Vec<LineStyle> {
    vec![
        LineStyle::new("black", 0.15, 9.0),
        LineStyle::new("white", 0.8, 6.0),
        LineStyle::new("red", 1.0, 2.0).dashed("7,12"),
    ]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LineOptions {
    pub styles: Vec<LineStyle>,
    pub missing_route_styles: Vec<LineStyle>,
    /// Route segments accept touches that insert a waypoint.
    pub add_waypoints: bool,
    /// Draw a connector from each waypoint to where the route picks it up.
    pub extend_to_waypoints: bool,
    /// Connectors are only drawn for waypoints farther than this from the route.
    pub missing_route_tolerance_m: f64,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            styles: route_styles(),
            missing_route_styles: missing_route_styles(),
            add_waypoints: true,
            extend_to_waypoints: true,
            missing_route_tolerance_m: 10.0,
        }
    }
}

impl LineOptions {
    /// Options for alternative routes: different colours, not touchable.
    pub fn alternative() -> Self {
        Self {
            styles: alternative_styles(),
            add_waypoints: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Route,
    /// Connector between an input waypoint and the route.
    MissingRoute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    pub kind: SegmentKind,
    pub style: LineStyle,
    pub points: Vec<LatLng>,
    pub touchable: bool,
}

/// Where a touch on the route line should insert a waypoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTouch {
    /// The new waypoint goes right after this waypoint index.
    pub after_index: usize,
    pub latlng: LatLng,
}

#[derive(Debug, Clone)]
pub struct RouteLine {
    route: Route,
    options: LineOptions,
    waypoint_indices: Vec<usize>,
    segments: Vec<LineSegment>,
}

impl RouteLine {
    pub fn new(route: Route, options: LineOptions) -> Self {
        let mut line = Self {
            route,
            options,
            waypoint_indices: Vec::new(),
            segments: Vec::new(),
        };
        line.waypoint_indices = if line.route.waypoint_indices.is_empty() {
            line.find_waypoint_indices()
        } else {
            line.route.waypoint_indices.clone()
        };
        if line.options.extend_to_waypoints {
            line.extend_to_waypoints();
        }
        line.add_route_segments();
        line
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn options(&self) -> &LineOptions {
        &self.options
    }

    /// Segments in drawing order.
    pub fn segments(&self) -> &[LineSegment] {
        &self.segments
    }

    /// Route coordinate index matched by each input waypoint.
    pub fn waypoint_indices(&self) -> &[usize] {
        &self.waypoint_indices
    }

    pub fn bounds(&self) -> Option<(LatLng, LatLng)> {
        self.route.bounds()
    }

    /// Index of the route coordinate closest to `latlng`.
    pub fn find_closest_route_point(&self, latlng: LatLng) -> Option<usize> {
        haversine::closest_index(&self.route.coordinates, latlng)
    }

    /// Last waypoint whose matched coordinate is at or before `coord_index`.
    pub fn find_nearest_waypoint_before(&self, coord_index: usize) -> Option<usize> {
        self.waypoint_indices
            .iter()
            .rposition(|&index| index <= coord_index)
    }

    /// Resolves a touch on the route line into an insertion point.
    ///
    /// Returns `None` when the line does not accept new waypoints.
    pub fn touch(&self, latlng: LatLng) -> Option<LineTouch> {
        if !self.options.add_waypoints {
            return None;
        }
        let closest = self.find_closest_route_point(latlng)?;
        let after_index = self.find_nearest_waypoint_before(closest)?;
        Some(LineTouch { after_index, latlng })
    }

    fn find_waypoint_indices(&self) -> Vec<usize> {
        self.route
            .input_waypoints
            .iter()
            .filter_map(|wp| wp.position)
            .filter_map(|position| self.find_closest_route_point(position))
            .collect()
    }

    fn extend_to_waypoints(&mut self) {
        let positions = self.route.input_waypoints.iter().filter_map(|wp| wp.position);
        let mut connectors = Vec::new();
        for (position, &index) in positions.zip(&self.waypoint_indices) {
            let Some(&on_route) = self.route.coordinates.get(index) else {
                continue;
            };
            if position.distance_to(on_route) > self.options.missing_route_tolerance_m {
                connectors.push(vec![position, on_route]);
            }
        }

        for points in connectors {
            for style in &self.options.missing_route_styles {
                self.segments.push(LineSegment {
                    kind: SegmentKind::MissingRoute,
                    style: style.clone(),
                    points: points.clone(),
                    touchable: false,
                });
            }
        }
    }

    fn add_route_segments(&mut self) {
        for style in &self.options.styles {
            self.segments.push(LineSegment {
                kind: SegmentKind::Route,
                style: style.clone(),
                points: self.route.coordinates.clone(),
                touchable: self.options.add_waypoints,
            });
        }
    }
}

//! The plan: the ordered waypoint list and its markers.
//!
//! Every change to the list goes through [`Plan::splice_waypoints`] (or its
//! full-replace form [`Plan::set_waypoints`]), which keeps at least two
//! waypoints in the list, rebuilds the markers and notifies listeners.
//!
//! Dragging a waypoint moves through `idle -> dragging -> released`; there is
//! no cancellation, releasing always commits.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::GeocodeError;
use crate::events::{Event, EventBus};
use crate::line::{self, LineStyle};
use crate::traits::Geocoder;
use crate::waypoint::{LatLng, Waypoint, fallback_name};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlanOptions {
    pub draggable_waypoints: bool,
    /// Allow inserting waypoints by dragging the route line.
    pub add_waypoints: bool,
    /// Insert dragged-out waypoints immediately instead of on release.
    pub route_while_dragging: bool,
    pub reverse_waypoints: bool,
    /// Reverse-geocoding hits farther than this are ignored.
    pub max_geocoder_tolerance_m: f64,
    pub drag_styles: Vec<LineStyle>,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            draggable_waypoints: true,
            add_waypoints: true,
            route_while_dragging: false,
            reverse_waypoints: false,
            max_geocoder_tolerance_m: 200.0,
            drag_styles: line::drag_styles(),
        }
    }
}

/// A waypoint marker for the host to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub waypoint_index: usize,
    pub position: LatLng,
    pub draggable: bool,
}

/// Builds the marker of waypoint `index` out of `count`, or none.
pub type MarkerFactory = Box<dyn Fn(usize, &Waypoint, usize) -> Option<Marker>>;

/// The default factory: one marker per positioned waypoint.
pub fn default_marker_factory(draggable: bool) -> MarkerFactory {
    Box::new(move |index: usize, waypoint: &Waypoint, _count: usize| {
        waypoint.position.map(|position| Marker {
            waypoint_index: index,
            position,
            draggable,
        })
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanEvent {
    WaypointsChanged {
        waypoints: Vec<Waypoint>,
    },
    WaypointsSpliced {
        index: usize,
        n_removed: usize,
        added: Vec<Waypoint>,
    },
    WaypointDragStart {
        index: usize,
        position: LatLng,
    },
    WaypointDrag {
        index: usize,
        position: LatLng,
    },
    WaypointDragEnd {
        index: usize,
        position: LatLng,
    },
    WaypointGeocoded {
        index: usize,
        waypoint: Waypoint,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanEventKind {
    WaypointsChanged,
    WaypointsSpliced,
    WaypointDragStart,
    WaypointDrag,
    WaypointDragEnd,
    WaypointGeocoded,
}

impl Event for PlanEvent {
    type Kind = PlanEventKind;

    fn kind(&self) -> PlanEventKind {
        match self {
            Self::WaypointsChanged { .. } => PlanEventKind::WaypointsChanged,
            Self::WaypointsSpliced { .. } => PlanEventKind::WaypointsSpliced,
            Self::WaypointDragStart { .. } => PlanEventKind::WaypointDragStart,
            Self::WaypointDrag { .. } => PlanEventKind::WaypointDrag,
            Self::WaypointDragEnd { .. } => PlanEventKind::WaypointDragEnd,
            Self::WaypointGeocoded { .. } => PlanEventKind::WaypointGeocoded,
        }
    }
}

/// Temporary marker and connecting lines of a new waypoint being dragged
/// out of the route line, before it is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPreview {
    pub after_index: usize,
    pub marker: LatLng,
    /// One polyline per drag style: previous waypoint, marker, next waypoint.
    pub lines: Vec<(LineStyle, Vec<LatLng>)>,
}

#[derive(Debug, Clone, PartialEq)]
enum NewWaypointDrag {
    /// The waypoint is already in the list at `index`.
    Live { index: usize },
    Preview(DragPreview),
}

pub struct Plan {
    waypoints: Vec<Waypoint>,
    markers: Vec<Marker>,
    options: PlanOptions,
    marker_factory: MarkerFactory,
    geocoder: Option<Box<dyn Geocoder>>,
    events: EventBus<PlanEvent>,
    dragging: Option<usize>,
    new_waypoint: Option<NewWaypointDrag>,
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("waypoints", &self.waypoints)
            .field("markers", &self.markers)
            .field("options", &self.options)
            .field("geocoder", &self.geocoder.is_some())
            .field("dragging", &self.dragging)
            .field("new_waypoint", &self.new_waypoint)
            .finish()
    }
}

impl Plan {
    pub fn new(waypoints: Vec<Waypoint>, options: PlanOptions) -> Self {
        let mut plan = Self {
            waypoints: Vec::new(),
            markers: Vec::new(),
            marker_factory: default_marker_factory(options.draggable_waypoints),
            options,
            geocoder: None,
            events: EventBus::new(),
            dragging: None,
            new_waypoint: None,
        };
        plan.set_waypoints(waypoints);
        plan
    }

    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Some(Box::new(geocoder));
        self
    }

    /// Replaces the marker factory and rebuilds the markers.
    pub fn set_marker_factory(&mut self, factory: MarkerFactory) {
        self.marker_factory = factory;
        self.update_markers();
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    pub fn set_route_while_dragging(&mut self, enabled: bool) {
        self.options.route_while_dragging = enabled;
    }

    pub fn events(&mut self) -> &mut EventBus<PlanEvent> {
        &mut self.events
    }

    /// Snapshot of the waypoint list.
    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.waypoints.clone()
    }

    pub fn waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Never true: the plan keeps at least two waypoints.
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// True when every waypoint has a position.
    pub fn is_ready(&self) -> bool {
        self.waypoints.iter().all(Waypoint::is_positioned)
    }

    /// Replaces the whole list. Fires `WaypointsChanged` but not
    /// `WaypointsSpliced`.
    pub fn set_waypoints(&mut self, waypoints: Vec<Waypoint>) -> Vec<Waypoint> {
        let len = self.waypoints.len();
        self.splice(0, len, waypoints, false)
    }

    /// Removes `delete_count` waypoints at `start` and inserts `items` there.
    ///
    /// A start past the end appends. Returns the removed waypoints.
    pub fn splice_waypoints(
        &mut self,
        start: usize,
        delete_count: usize,
        items: Vec<Waypoint>,
    ) -> Vec<Waypoint> {
        self.splice(start, delete_count, items, true)
    }

    fn splice(
        &mut self,
        start: usize,
        delete_count: usize,
        items: Vec<Waypoint>,
        indexed: bool,
    ) -> Vec<Waypoint> {
        let start = start.min(self.waypoints.len());
        let end = start.saturating_add(delete_count).min(self.waypoints.len());
        let removed: Vec<Waypoint> =
            self.waypoints.splice(start..end, items.iter().cloned()).collect();

        if self.waypoints.len() < 2 {
            let len = self.waypoints.len();
            self.splice(len, 0, vec![Waypoint::empty()], true);
        }

        self.update_markers();
        self.fire_changed();
        if indexed {
            self.events.fire(&PlanEvent::WaypointsSpliced {
                index: start,
                n_removed: removed.len(),
                added: items,
            });
        }
        removed
    }

    fn update_markers(&mut self) {
        let count = self.waypoints.len();
        self.markers = self
            .waypoints
            .iter()
            .enumerate()
            .filter(|(_, wp)| wp.is_positioned())
            .filter_map(|(index, wp)| (self.marker_factory)(index, wp, count))
            .collect();
    }

    fn fire_changed(&mut self) {
        let waypoints = self.waypoints();
        self.events.fire(&PlanEvent::WaypointsChanged { waypoints });
    }

    fn move_waypoint(&mut self, index: usize, position: LatLng) {
        self.waypoints[index].position = Some(position);
        for marker in self.markers.iter_mut().filter(|m| m.waypoint_index == index) {
            marker.position = position;
        }
    }

    /// Starts dragging the marker of waypoint `index`.
    pub fn drag_start(&mut self, index: usize) -> bool {
        let Some(position) = self.waypoints.get(index).and_then(|wp| wp.position) else {
            return false;
        };
        self.dragging = Some(index);
        self.events.fire(&PlanEvent::WaypointDragStart { index, position });
        true
    }

    /// Streams a new position for the waypoint being dragged.
    pub fn drag(&mut self, index: usize, position: LatLng) -> bool {
        if index >= self.waypoints.len() {
            return false;
        }
        self.move_waypoint(index, position);
        self.events.fire(&PlanEvent::WaypointDrag { index, position });
        true
    }

    /// Commits a drag: the name is cleared so it gets resolved again.
    pub fn drag_end(&mut self, index: usize, position: LatLng) -> bool {
        if index >= self.waypoints.len() {
            return false;
        }
        self.dragging = None;
        self.move_waypoint(index, position);
        self.waypoints[index].name.clear();
        self.events.fire(&PlanEvent::WaypointDragEnd { index, position });
        self.fire_changed();
        if self.geocoder.is_some() {
            self.reverse_geocode(index);
        }
        true
    }

    /// Index of the waypoint whose marker is being dragged.
    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Starts dragging a new waypoint out of the route line, to be inserted
    /// after `after_index`.
    ///
    /// With `route_while_dragging` the waypoint is inserted right away and
    /// tracked as a live drag; otherwise only a [`DragPreview`] exists until
    /// [`Plan::pointer_up`].
    pub fn drag_new_waypoint(&mut self, after_index: usize, position: LatLng) {
        let index = after_index.saturating_add(1).min(self.waypoints.len());
        if self.options.route_while_dragging {
            self.splice_waypoints(index, 0, vec![Waypoint::at(position)]);
            self.new_waypoint = Some(NewWaypointDrag::Live { index });
            self.dragging = Some(index);
            self.events.fire(&PlanEvent::WaypointDragStart { index, position });
        } else {
            let preview = self.preview(index - 1, position);
            self.new_waypoint = Some(NewWaypointDrag::Preview(preview));
        }
        debug!(after_index, live = self.options.route_while_dragging, "dragging new waypoint");
    }

    fn preview(&self, after_index: usize, marker: LatLng) -> DragPreview {
        let before = self.waypoints.get(after_index).and_then(|wp| wp.position);
        let after = self.waypoints.get(after_index + 1).and_then(|wp| wp.position);
        let points: Vec<LatLng> = before.into_iter().chain([marker]).chain(after).collect();
        DragPreview {
            after_index,
            marker,
            lines: self
                .options
                .drag_styles
                .iter()
                .map(|style| (style.clone(), points.clone()))
                .collect(),
        }
    }

    pub fn drag_preview(&self) -> Option<&DragPreview> {
        match &self.new_waypoint {
            Some(NewWaypointDrag::Preview(preview)) => Some(preview),
            _ => None,
        }
    }

    /// Index of the live new waypoint being dragged, if any.
    pub fn live_new_waypoint(&self) -> Option<usize> {
        match self.new_waypoint {
            Some(NewWaypointDrag::Live { index }) => Some(index),
            _ => None,
        }
    }

    /// Pointer moved during a new-waypoint drag.
    pub fn pointer_move(&mut self, position: LatLng) -> bool {
        match self.new_waypoint.take() {
            Some(NewWaypointDrag::Live { index }) => {
                self.new_waypoint = Some(NewWaypointDrag::Live { index });
                self.drag(index, position)
            }
            Some(NewWaypointDrag::Preview(preview)) => {
                let preview = self.preview(preview.after_index, position);
                self.new_waypoint = Some(NewWaypointDrag::Preview(preview));
                true
            }
            None => false,
        }
    }

    /// Pointer released: commits the new waypoint.
    pub fn pointer_up(&mut self, position: LatLng) -> bool {
        match self.new_waypoint.take() {
            Some(NewWaypointDrag::Live { index }) => self.drag_end(index, position),
            Some(NewWaypointDrag::Preview(preview)) => {
                self.splice_waypoints(preview.after_index + 1, 0, vec![Waypoint::at(position)]);
                true
            }
            None => false,
        }
    }

    /// Reverses the waypoint order, when enabled.
    pub fn reverse(&mut self) -> bool {
        if !self.options.reverse_waypoints {
            return false;
        }
        let mut waypoints = self.waypoints();
        waypoints.reverse();
        self.set_waypoints(waypoints);
        true
    }

    /// Geocodes `query` and moves waypoint `index` to the best match.
    ///
    /// Returns `Ok(false)` when there is no geocoder or no match.
    pub fn geocode_waypoint(&mut self, index: usize, query: &str) -> Result<bool, GeocodeError> {
        let Some(geocoder) = &self.geocoder else {
            return Ok(false);
        };
        if index >= self.waypoints.len() {
            return Ok(false);
        }
        let Some(best) = geocoder.geocode(query)?.into_iter().next() else {
            debug!(query, "no geocoding match");
            return Ok(false);
        };

        let waypoint = &mut self.waypoints[index];
        waypoint.position = Some(best.center);
        waypoint.name = best.name;
        let waypoint = waypoint.clone();

        self.update_markers();
        self.fire_changed();
        self.events.fire(&PlanEvent::WaypointGeocoded { index, waypoint });
        Ok(true)
    }

    /// Names waypoint `index` after the nearest reverse-geocoding hit, or
    /// after its coordinate when there is no acceptable hit.
    pub fn reverse_geocode(&mut self, index: usize) -> bool {
        let Some(position) = self.waypoints.get(index).and_then(|wp| wp.position) else {
            return false;
        };
        let Some(geocoder) = &self.geocoder else {
            return false;
        };

        let tolerance = self.options.max_geocoder_tolerance_m;
        let name = match geocoder.reverse(position) {
            Ok(results) => results
                .into_iter()
                .next()
                .filter(|best| best.center.distance_to(position) <= tolerance)
                .map(|best| best.name),
            Err(err) => {
                warn!(error = %err, "reverse geocoding failed");
                None
            }
        };

        let waypoint = &mut self.waypoints[index];
        waypoint.name = name.unwrap_or_else(|| fallback_name(position));
        let waypoint = waypoint.clone();
        self.events.fire(&PlanEvent::WaypointGeocoded { index, waypoint });
        true
    }
}

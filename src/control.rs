//! The routing control: ties a [`Plan`] to a [`Router`] and keeps the
//! current routes, their lines and the itinerary in sync with it.
//!
//! Requests are tagged with a counter. Only the most recently issued request
//! may apply its result; anything older is discarded when it completes, and
//! is aborted as soon as a newer request is issued.
//!
//! [`RoutingControl::route`] runs the router inline. Hosts that route
//! elsewhere use [`RoutingControl::begin_request`] and hand the outcome back
//! through [`RoutingControl::complete_request`].

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::error::{GeocodeError, RoutingError};
use crate::events::{Event, EventBus};
use crate::itinerary::{Itinerary, ItineraryRow};
use crate::line::{LineOptions, RouteLine};
use crate::plan::{Plan, PlanEvent};
use crate::route::{AbortHandle, Route, RouteOptions};
use crate::traits::Router;
use crate::waypoint::{LatLng, Waypoint};

/// What the plan's waypoints follow once a route is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointMode {
    /// Waypoints stay where the user put them.
    #[default]
    Connect,
    /// Waypoints move onto the road network positions returned by the router.
    Snap,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlOptions {
    /// Route whenever the waypoints change.
    pub auto_route: bool,
    /// Request geometry previews while a waypoint is dragged.
    pub route_while_dragging: bool,
    pub route_drag_interval_ms: u64,
    pub waypoint_mode: WaypointMode,
    pub show_alternatives: bool,
    pub line_options: LineOptions,
    pub alt_line_options: LineOptions,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            auto_route: true,
            route_while_dragging: false,
            route_drag_interval_ms: 500,
            waypoint_mode: WaypointMode::Connect,
            show_alternatives: false,
            line_options: LineOptions::default(),
            alt_line_options: LineOptions::alternative(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    RoutingStart {
        waypoints: Vec<Waypoint>,
    },
    RoutesFound {
        waypoints: Vec<Waypoint>,
        routes: Vec<Route>,
    },
    RouteSelected {
        route: Route,
        alternatives: Vec<Route>,
    },
    /// Never fired for aborted requests.
    RoutingError {
        error: RoutingError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlEventKind {
    RoutingStart,
    RoutesFound,
    RouteSelected,
    RoutingError,
}

impl Event for ControlEvent {
    type Kind = ControlEventKind;

    fn kind(&self) -> ControlEventKind {
        match self {
            Self::RoutingStart { .. } => ControlEventKind::RoutingStart,
            Self::RoutesFound { .. } => ControlEventKind::RoutesFound,
            Self::RouteSelected { .. } => ControlEventKind::RouteSelected,
            Self::RoutingError { .. } => ControlEventKind::RoutingError,
        }
    }
}

/// An issued route request.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    id: u64,
    pub waypoints: Vec<Waypoint>,
    pub options: RouteOptions,
}

impl RouteRequest {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
pub struct RoutingControl<R> {
    router: R,
    plan: Plan,
    options: ControlOptions,
    itinerary: Itinerary,
    events: EventBus<ControlEvent>,
    request_count: u64,
    pending: Option<AbortHandle>,
    routes: Vec<Route>,
    selected: Option<usize>,
    line: Option<RouteLine>,
    alternative_lines: Vec<RouteLine>,
    /// When the next drag preview request is due.
    drag_deadline: Option<Instant>,
}

impl<R: Router> RoutingControl<R> {
    pub fn new(router: R, mut plan: Plan, options: ControlOptions, itinerary: Itinerary) -> Self {
        plan.set_route_while_dragging(options.route_while_dragging);
        Self {
            router,
            plan,
            options,
            itinerary,
            events: EventBus::new(),
            request_count: 0,
            pending: None,
            routes: Vec::new(),
            selected: None,
            line: None,
            alternative_lines: Vec::new(),
            drag_deadline: None,
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn options(&self) -> &ControlOptions {
        &self.options
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Direct access to the plan. Changes made through it do not trigger
    /// routing; call [`RoutingControl::route`] afterwards.
    pub fn plan_mut(&mut self) -> &mut Plan {
        &mut self.plan
    }

    pub fn events(&mut self) -> &mut EventBus<ControlEvent> {
        &mut self.events
    }

    pub fn plan_events(&mut self) -> &mut EventBus<PlanEvent> {
        self.plan.events()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn selected_route(&self) -> Option<&Route> {
        self.selected.and_then(|index| self.routes.get(index))
    }

    /// Every route except the selected one.
    pub fn alternatives(&self) -> Vec<&Route> {
        self.routes
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != self.selected)
            .map(|(_, route)| route)
            .collect()
    }

    pub fn line(&self) -> Option<&RouteLine> {
        self.line.as_ref()
    }

    pub fn alternative_lines(&self) -> &[RouteLine] {
        &self.alternative_lines
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    /// Rows of the selected route.
    pub fn itinerary_rows(&self) -> Vec<ItineraryRow> {
        self.selected_route()
            .map(|route| self.itinerary.rows(route))
            .unwrap_or_default()
    }

    /// Summaries of every route, in response order.
    pub fn summaries(&self) -> Vec<String> {
        self.itinerary.summaries(&self.routes)
    }

    /// Issues a request for the current waypoints.
    ///
    /// Aborts the previous request. Returns `None` when the plan is not
    /// ready; the previous request is aborted regardless.
    pub fn begin_request(&mut self, options: RouteOptions) -> Option<RouteRequest> {
        self.request_count += 1;
        if let Some(previous) = self.pending.take() {
            debug!(request = self.request_count - 1, "aborting superseded request");
            previous.abort();
        }
        if !self.plan.is_ready() {
            return None;
        }

        let waypoints = self.plan.waypoints();
        self.pending = Some(options.abort.clone());
        debug!(
            request = self.request_count,
            waypoints = waypoints.len(),
            geometry_only = options.geometry_only,
            "routing"
        );
        self.events.fire(&ControlEvent::RoutingStart {
            waypoints: waypoints.clone(),
        });

        Some(RouteRequest {
            id: self.request_count,
            waypoints,
            options,
        })
    }

    /// Applies the result of `request`.
    ///
    /// Returns `false` when the result was discarded: the request was
    /// superseded or aborted.
    pub fn complete_request(
        &mut self,
        request: RouteRequest,
        result: Result<Vec<Route>, RoutingError>,
    ) -> bool {
        if request.id != self.request_count {
            debug!(
                request = request.id,
                latest = self.request_count,
                "discarding stale response"
            );
            return false;
        }
        self.pending = None;

        let mut routes = match result {
            Ok(routes) => routes,
            Err(error) if error.is_abort() => {
                debug!(request = request.id, "request aborted");
                return false;
            }
            Err(error) => {
                warn!(request = request.id, error = %error, "routing error");
                if request.options.geometry_only {
                    self.clear_lines();
                }
                self.events.fire(&ControlEvent::RoutingError { error });
                return true;
            }
        };

        for (index, route) in routes.iter_mut().enumerate() {
            route.routes_index = index;
        }

        if request.options.geometry_only {
            match routes.split_first() {
                Some((route, alternatives)) => {
                    self.update_lines(route.clone(), alternatives.to_vec())
                }
                None => self.clear_lines(),
            }
        } else {
            self.events.fire(&ControlEvent::RoutesFound {
                waypoints: request.waypoints,
                routes: routes.clone(),
            });
            self.set_alternatives(routes);
        }
        true
    }

    /// Routes the current waypoints with the configured router.
    pub fn route(&mut self) -> bool {
        self.route_with(RouteOptions::default())
    }

    pub fn route_with(&mut self, options: RouteOptions) -> bool {
        let Some(request) = self.begin_request(options) else {
            return false;
        };
        let result = self.router.route(&request.waypoints, &request.options);
        self.complete_request(request, result)
    }

    /// Replaces the routes and selects the first one.
    pub fn set_alternatives(&mut self, routes: Vec<Route>) {
        self.routes = routes;
        self.selected = None;
        if !self.select_route(0) {
            self.clear_lines();
        }
    }

    /// Makes `index` the selected route and the others its alternatives.
    pub fn select_route(&mut self, index: usize) -> bool {
        let Some(route) = self.routes.get(index).cloned() else {
            return false;
        };
        self.selected = Some(index);
        let alternatives: Vec<Route> = self.alternatives().into_iter().cloned().collect();
        self.update_lines(route.clone(), alternatives.clone());

        if self.options.waypoint_mode == WaypointMode::Snap
            && !route.waypoints.is_empty()
            && route.waypoints.len() == self.plan.len()
        {
            self.plan.set_waypoints(route.waypoints.clone());
        }

        self.events.fire(&ControlEvent::RouteSelected { route, alternatives });
        true
    }

    fn update_lines(&mut self, route: Route, alternatives: Vec<Route>) {
        self.line = Some(RouteLine::new(route, self.options.line_options.clone()));
        self.alternative_lines = if self.options.show_alternatives {
            alternatives
                .into_iter()
                .map(|alt| RouteLine::new(alt, self.options.alt_line_options.clone()))
                .collect()
        } else {
            Vec::new()
        };
    }

    fn clear_lines(&mut self) {
        self.line = None;
        self.alternative_lines.clear();
    }

    fn waypoints_changed(&mut self) {
        if self.options.auto_route {
            self.route();
        }
        if !self.plan.is_ready() {
            self.routes.clear();
            self.selected = None;
            self.clear_lines();
        }
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.plan.set_waypoints(waypoints);
        self.waypoints_changed();
    }

    pub fn splice_waypoints(
        &mut self,
        start: usize,
        delete_count: usize,
        items: Vec<Waypoint>,
    ) -> Vec<Waypoint> {
        let removed = self.plan.splice_waypoints(start, delete_count, items);
        self.waypoints_changed();
        removed
    }

    pub fn reverse_waypoints(&mut self) -> bool {
        let reversed = self.plan.reverse();
        if reversed {
            self.waypoints_changed();
        }
        reversed
    }

    pub fn geocode_waypoint(&mut self, index: usize, query: &str) -> Result<bool, GeocodeError> {
        let moved = self.plan.geocode_waypoint(index, query)?;
        if moved {
            self.waypoints_changed();
        }
        Ok(moved)
    }

    pub fn drag_start(&mut self, index: usize) -> bool {
        self.plan.drag_start(index)
    }

    /// Moves a dragged waypoint; `now` drives the preview throttle.
    pub fn drag(&mut self, index: usize, position: LatLng, now: Instant) -> bool {
        let moved = self.plan.drag(index, position);
        if moved {
            self.arm_drag_timer(now);
        }
        moved
    }

    pub fn drag_end(&mut self, index: usize, position: LatLng) -> bool {
        if !self.plan.drag_end(index, position) {
            return false;
        }
        self.finish_drag();
        true
    }

    /// Forwards a touch on the main route line to the plan, which starts
    /// dragging a new waypoint out of it.
    pub fn touch_line(&mut self, latlng: LatLng) -> bool {
        if !self.plan.options().add_waypoints {
            return false;
        }
        let Some(touch) = self.line.as_ref().and_then(|line| line.touch(latlng)) else {
            return false;
        };
        self.plan.drag_new_waypoint(touch.after_index, touch.latlng);
        if self.plan.live_new_waypoint().is_some() {
            self.waypoints_changed();
        }
        true
    }

    pub fn pointer_move(&mut self, position: LatLng, now: Instant) -> bool {
        let moved = self.plan.pointer_move(position);
        if moved && self.plan.live_new_waypoint().is_some() {
            self.arm_drag_timer(now);
        }
        moved
    }

    pub fn pointer_up(&mut self, position: LatLng) -> bool {
        if !self.plan.pointer_up(position) {
            return false;
        }
        self.finish_drag();
        true
    }

    /// Issues the pending drag preview request once it is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.drag_deadline {
            Some(deadline) if now >= deadline => {
                trace!("drag preview due");
                self.drag_deadline = None;
                self.route_with(RouteOptions {
                    geometry_only: true,
                    ..RouteOptions::default()
                })
            }
            _ => false,
        }
    }

    pub fn drag_deadline(&self) -> Option<Instant> {
        self.drag_deadline
    }

    fn arm_drag_timer(&mut self, now: Instant) {
        if !self.options.route_while_dragging {
            return;
        }
        if self.drag_deadline.is_none() {
            let deadline = now + Duration::from_millis(self.options.route_drag_interval_ms);
            trace!(interval_ms = self.options.route_drag_interval_ms, "drag preview scheduled");
            self.drag_deadline = Some(deadline);
        } else {
            trace!("drag preview already scheduled");
        }
    }

    fn finish_drag(&mut self) {
        self.drag_deadline = None;
        self.waypoints_changed();
        if !self.options.auto_route && self.options.route_while_dragging {
            self.route();
        }
    }
}

//! Plan and routing control behaviour, end to end through the OSRM client.

mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use rstest::rstest;

use fixtures::*;
use route_control::control::{ControlEvent, ControlEventKind, ControlOptions, RoutingControl};
use route_control::events::Event;
use route_control::formatter::{Formatter, FormatterOptions, Units};
use route_control::itinerary::Itinerary;
use route_control::osrm::{OsrmClient, OsrmConfig};
use route_control::plan::{Plan, PlanEventKind, PlanOptions};
use route_control::route::RouteOptions;
use route_control::waypoint::Waypoint;
use route_control::{RoutingConfig, RoutingError};

fn osrm_control(server: &MockServer, itinerary: Itinerary) -> RoutingControl<OsrmClient> {
    let client = OsrmClient::new(OsrmConfig {
        service_url: server.base_url.clone(),
        ..OsrmConfig::default()
    })
    .expect("client");
    let plan = Plan::new(Vec::new(), PlanOptions::default());
    RoutingControl::new(client, plan, ControlOptions::default(), itinerary)
}

fn record(control: &mut RoutingControl<OsrmClient>) -> Rc<RefCell<Vec<ControlEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    control
        .events()
        .on_any(move |event| sink.borrow_mut().push(event.clone()));
    seen
}

// ============================================================================
// Plan invariants
// ============================================================================

#[rstest]
#[case(2, 0, 2)]
#[case(2, 1, 5)]
#[case(3, 0, 3)]
#[case(4, 1, 2)]
#[case(2, 7, 0)]
fn splice_never_leaves_fewer_than_two(
    #[case] initial: usize,
    #[case] start: usize,
    #[case] delete: usize,
) {
    let waypoints = [CHECKPOINT_CHARLIE, ORANIENBURGER_TOR, ALEXANDERPLATZ, POTSDAMER_PLATZ]
        .into_iter()
        .take(initial)
        .map(Waypoint::at)
        .collect();
    let mut plan = Plan::new(waypoints, PlanOptions::default());

    plan.splice_waypoints(start, delete, Vec::new());

    assert!(plan.len() >= 2);
    let removed = delete.min(initial.saturating_sub(start));
    assert_eq!(plan.len(), initial.saturating_sub(removed).max(2));
}

#[test]
fn padding_waypoints_are_announced() {
    let mut plan = Plan::new(vec![Waypoint::at(CHECKPOINT_CHARLIE)], PlanOptions::default());
    assert_eq!(plan.len(), 2);
    assert!(!plan.is_ready());

    let spliced = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&spliced);
    plan.events()
        .on(PlanEventKind::WaypointsSpliced, move |_| *sink.borrow_mut() += 1);
    plan.set_waypoints(Vec::new());

    // The full replace itself is silent; each padding waypoint is a splice.
    assert_eq!(*spliced.borrow(), 2);
}

// ============================================================================
// Routing through the control
// ============================================================================

#[test]
fn waypoints_change_routes_and_fills_itinerary() {
    let server = MockServer::start(vec![MockResponse::ok(friedrichstrasse_response())]);
    let mut control = osrm_control(&server, Itinerary::default());
    let seen = record(&mut control);

    control.set_waypoints(vec![
        Waypoint::at(CHECKPOINT_CHARLIE),
        Waypoint::at(ORANIENBURGER_TOR),
    ]);

    let kinds: Vec<ControlEventKind> = seen.borrow().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ControlEventKind::RoutingStart,
            ControlEventKind::RoutesFound,
            ControlEventKind::RouteSelected,
        ]
    );

    assert_eq!(control.summaries(), vec!["Friedrichstraße: 1.9 km, 4 min".to_string()]);
    let rows = control.itinerary_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].icon, Some("depart"));
    assert_eq!(rows[0].text, "Head north on Friedrichstraße");
    assert_eq!(rows[0].distance, "2 km");
    assert_eq!(rows[1].icon, Some("arrive"));
    assert_eq!(rows[1].distance, "");

    let line = control.line().expect("route line");
    assert_eq!(line.waypoint_indices(), &[0, 3]);
}

#[test]
fn imperial_itinerary() {
    let server = MockServer::start(vec![MockResponse::ok(friedrichstrasse_response())]);
    let formatter = Formatter::new(FormatterOptions {
        units: Units::Imperial,
        ..FormatterOptions::default()
    });
    let mut control = osrm_control(&server, Itinerary::new(formatter));

    control.set_waypoints(vec![
        Waypoint::at(CHECKPOINT_CHARLIE),
        Waypoint::at(ORANIENBURGER_TOR),
    ]);

    assert_eq!(control.itinerary_rows()[0].distance, "1 mi");
}

#[test]
fn service_rejection_is_reported_once() {
    let server = MockServer::start(vec![MockResponse::status(
        400,
        r#"{"code": "NoSegment", "message": "Could not find a matching segment"}"#,
    )]);
    let mut control = osrm_control(&server, Itinerary::default());
    let seen = record(&mut control);

    control.set_waypoints(vec![
        Waypoint::at(CHECKPOINT_CHARLIE),
        Waypoint::at(ORANIENBURGER_TOR),
    ]);

    let errors: Vec<RoutingError> = seen
        .borrow()
        .iter()
        .filter_map(|event| match event {
            ControlEvent::RoutingError { error } => Some(error.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].service_code(), Some("NoSegment"));
    assert!(control.selected_route().is_none());
}

#[test]
fn incomplete_plan_is_not_routed() {
    let server = MockServer::start(Vec::new());
    let mut control = osrm_control(&server, Itinerary::default());
    let seen = record(&mut control);

    control.set_waypoints(vec![Waypoint::at(CHECKPOINT_CHARLIE), Waypoint::empty()]);

    assert!(seen.borrow().is_empty());
    assert!(!control.route());
}

#[test]
fn older_request_cannot_overwrite_newer() {
    let server = MockServer::start(vec![
        MockResponse::ok(friedrichstrasse_response()),
        MockResponse::ok(friedrichstrasse_response()),
    ]);
    let mut control = osrm_control(&server, Itinerary::default());
    control.plan_mut().set_waypoints(vec![
        Waypoint::at(CHECKPOINT_CHARLIE),
        Waypoint::at(ORANIENBURGER_TOR),
    ]);

    let a = control.begin_request(RouteOptions::default()).expect("ready");
    let b = control.begin_request(RouteOptions::default()).expect("ready");
    assert!(a.options.abort.is_aborted());
    assert!(!b.options.abort.is_aborted());

    let b_result = route_control::traits::Router::route(control.router(), &b.waypoints, &b.options);
    let a_result = route_control::traits::Router::route(control.router(), &a.waypoints, &a.options);
    assert_eq!(a_result, Err(RoutingError::Aborted));

    assert!(control.complete_request(b, b_result));
    assert!(!control.complete_request(a, a_result));
    assert_eq!(control.routes().len(), 1);
}

#[test]
fn config_drives_control_options() {
    let config = RoutingConfig::from_json(
        r#"{"control": {"auto_route": false, "show_alternatives": true}}"#,
    )
    .expect("config");
    let server = MockServer::start(Vec::new());
    let client = OsrmClient::new(OsrmConfig {
        service_url: server.base_url.clone(),
        ..config.osrm.clone()
    })
    .expect("client");
    let plan = Plan::new(Vec::new(), config.plan.clone());
    let mut control = RoutingControl::new(
        client,
        plan,
        config.control.clone(),
        Itinerary::new(Formatter::new(config.formatter.clone())),
    );
    let seen = record(&mut control);

    control.set_waypoints(vec![
        Waypoint::at(CHECKPOINT_CHARLIE),
        Waypoint::at(ORANIENBURGER_TOR),
    ]);

    assert!(seen.borrow().is_empty());
    assert!(control.options().show_alternatives);
}

//! Test fixtures for route-control.
//!
//! Provides:
//! - Real Berlin locations (from OpenStreetMap)
//! - Builders for OSRM route responses
//! - A one-shot HTTP responder standing in for the route service

#![allow(dead_code)]

pub mod berlin_locations;

pub use berlin_locations::*;

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

use route_control::polyline;
use route_control::waypoint::LatLng;

// ============================================================================
// Response builders
// ============================================================================

/// Builder for one OSRM step.
#[derive(Clone, Debug)]
pub struct TestStep {
    maneuver_type: String,
    modifier: Option<String>,
    name: String,
    reference: Option<String>,
    points: Vec<LatLng>,
    distance: f64,
    duration: f64,
    bearing_after: f64,
    exit: Option<u32>,
    mode: String,
    lanes: Option<Vec<bool>>,
}

impl TestStep {
    pub fn new(maneuver_type: &str) -> Self {
        Self {
            maneuver_type: maneuver_type.to_string(),
            modifier: None,
            name: String::new(),
            reference: None,
            points: Vec::new(),
            distance: 0.0,
            duration: 0.0,
            bearing_after: 0.0,
            exit: None,
            mode: "driving".to_string(),
            lanes: None,
        }
    }

    pub fn modifier(mut self, modifier: &str) -> Self {
        self.modifier = Some(modifier.to_string());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn points(mut self, points: &[LatLng]) -> Self {
        self.points = points.to_vec();
        self
    }

    pub fn distance(mut self, distance: f64, duration: f64) -> Self {
        self.distance = distance;
        self.duration = duration;
        self
    }

    pub fn bearing(mut self, bearing_after: f64) -> Self {
        self.bearing_after = bearing_after;
        self
    }

    pub fn exit(mut self, exit: u32) -> Self {
        self.exit = Some(exit);
        self
    }

    pub fn mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    pub fn lanes(mut self, lanes: &[bool]) -> Self {
        self.lanes = Some(lanes.to_vec());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut maneuver = json!({
            "type": self.maneuver_type,
            "bearing_after": self.bearing_after,
        });
        if let Some(modifier) = &self.modifier {
            maneuver["modifier"] = json!(modifier);
        }
        if let Some(exit) = self.exit {
            maneuver["exit"] = json!(exit);
        }

        let mut intersection = json!({ "classes": [] });
        if let Some(lanes) = &self.lanes {
            intersection["lanes"] = lanes
                .iter()
                .map(|valid| json!({ "valid": valid, "indications": ["straight"] }))
                .collect();
        }

        let mut step = json!({
            "geometry": polyline::encode(&self.points, polyline::DEFAULT_PRECISION)
                .expect("fixture coordinates are valid"),
            "maneuver": maneuver,
            "distance": self.distance,
            "duration": self.duration,
            "name": self.name,
            "mode": self.mode,
            "intersections": [intersection],
        });
        if let Some(reference) = &self.reference {
            step["ref"] = json!(reference);
        }
        step
    }
}

/// One leg with `summary` and `steps`.
pub fn leg(summary: &str, steps: &[TestStep]) -> Value {
    json!({
        "summary": summary,
        "steps": steps.iter().map(TestStep::to_json).collect::<Vec<_>>(),
    })
}

/// A route made of `legs`.
pub fn route(distance: f64, duration: f64, legs: Vec<Value>) -> Value {
    json!({ "distance": distance, "duration": duration, "legs": legs })
}

/// A successful response. `snapped` are the snapped locations and hints.
pub fn ok_response(snapped: &[(LatLng, &str)], routes: Vec<Value>) -> String {
    let waypoints: Vec<Value> = snapped
        .iter()
        .map(|(position, hint)| {
            json!({ "location": [position.lng, position.lat], "name": "", "hint": hint })
        })
        .collect();
    json!({ "code": "Ok", "waypoints": waypoints, "routes": routes }).to_string()
}

/// The two-waypoint depart/arrive route through Friedrichstraße.
pub fn friedrichstrasse_response() -> String {
    let depart = TestStep::new("depart")
        .name("Friedrichstraße")
        .points(&[CHECKPOINT_CHARLIE, FRIEDRICHSTRASSE_STATION, ORANIENBURGER_TOR])
        .distance(1866.3, 241.5)
        .bearing(2.0);
    let arrive = TestStep::new("arrive")
        .name("Friedrichstraße")
        .points(&[ORANIENBURGER_TOR]);

    ok_response(
        &[(CHECKPOINT_CHARLIE, "hint-a"), (ORANIENBURGER_TOR, "hint-b")],
        vec![route(1866.3, 241.5, vec![leg("friedrichstraße", &[depart, arrive])])],
    )
}

// ============================================================================
// One-shot HTTP responder
// ============================================================================

#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl MockResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status: 200,
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Serves each response to one connection, in order, then stops.
pub struct MockServer {
    pub base_url: String,
    requests: mpsc::Receiver<String>,
}

impl MockServer {
    pub fn start(responses: Vec<MockResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("local addr").port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for response in responses {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                if let Err(err) = serve_one(stream, &response, &tx) {
                    eprintln!("mock OSRM server: {}", err);
                }
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/route/v1", port),
            requests: rx,
        }
    }

    /// Path and query of the next request the server received.
    pub fn next_request(&self) -> String {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("mock server received a request")
    }
}

fn serve_one(
    mut stream: TcpStream,
    response: &MockResponse,
    requests: &mpsc::Sender<String>,
) -> io::Result<()> {
    let mut received = Vec::new();
    let mut buf = [0u8; 1024];
    while !received.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf)?;
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }

    let head = String::from_utf8_lossy(&received);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    // The receiving test may already have finished.
    requests.send(target).ok();

    thread::sleep(response.delay);
    write!(
        stream,
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        response.body.len(),
        response.body
    )?;
    stream.flush()
}

//! Test fixtures for tour-planner.
//!
//! Provides:
//! - Real Las Vegas Strip landmarks for walking tours
//! - A scripted routing backend that counts calls
//! - A settable clock for quota periods

#![allow(dead_code)]

pub mod strip_walk;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use tour_planner::error::RoutingError;
use tour_planner::matrix::{Cell, Coordinate, TableResponse};
use tour_planner::traits::{Clock, RoutingBackend};

pub use strip_walk::*;

/// What the stub backend answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Manhattan-distance table over the requested coordinates.
    Manhattan,
    /// A fixed table.
    Table(TableResponse),
    Transport,
    Status(u16, &'static str),
    Malformed,
}

/// Routing backend double with a shared call counter.
#[derive(Clone)]
pub struct StubBackend {
    reply: Arc<Mutex<Reply>>,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Vec<Coordinate>>>,
    metered: bool,
}

impl StubBackend {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(Vec::new())),
            metered: true,
        }
    }

    pub fn unmetered(mut self) -> Self {
        self.metered = false;
        self
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Vec<Coordinate> {
        self.last_request.lock().clone()
    }
}

impl RoutingBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn metered(&self) -> bool {
        self.metered
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<TableResponse, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = coordinates.to_vec();

        match self.reply.lock().clone() {
            Reply::Manhattan => Ok(manhattan_table(coordinates)),
            Reply::Table(table) => Ok(table),
            Reply::Transport => Err(RoutingError::Transport {
                message: "connection refused".to_string(),
            }),
            Reply::Status(status, body) => Err(RoutingError::Status {
                status,
                body: body.to_string(),
            }),
            Reply::Malformed => Err(RoutingError::Malformed {
                reason: "invalid table JSON".to_string(),
                status: 200,
                body: "<html>".to_string(),
            }),
        }
    }
}

/// Manhattan distance in degrees * 100_000 as meters, * 0.72 as seconds.
pub fn manhattan_table(coordinates: &[Coordinate]) -> TableResponse {
    let distances: Vec<Vec<Cell>> = coordinates
        .iter()
        .map(|from| {
            coordinates
                .iter()
                .map(|to| Some(((from.lat - to.lat).abs() + (from.lng - to.lng).abs()) * 100_000.0))
                .collect()
        })
        .collect();
    let durations = distances
        .iter()
        .map(|row| row.iter().map(|cell| cell.map(|m| m * 0.72)).collect())
        .collect();

    TableResponse {
        code: Some("Ok".to_string()),
        message: None,
        durations: Some(durations),
        distances: Some(distances),
        raw_body: None,
    }
}

/// Table with identical distance and duration cells.
pub fn table_from(rows: Vec<Vec<Cell>>) -> TableResponse {
    TableResponse {
        code: Some("Ok".to_string()),
        message: None,
        durations: Some(rows.clone()),
        distances: Some(rows),
        raw_body: None,
    }
}

/// Clock pinned to a settable instant.
#[derive(Clone)]
pub struct FixedClock(Arc<Mutex<DateTime<Utc>>>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32) -> Self {
        Self(Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap(),
        )))
    }

    pub fn set(&self, year: i32, month: u32, day: u32) {
        *self.0.lock() = Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

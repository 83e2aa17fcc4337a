//! tour-planner core
//!
//! Orders the markers of a tour with a nearest-neighbor heuristic over a
//! walking distance/duration matrix fetched from a quota-guarded routing
//! provider.

pub mod traits;
pub mod error;
pub mod matrix;
pub mod quota;
pub mod sqlite_store;
pub mod provider;
pub mod osrm;
pub mod mapbox;
pub mod haversine;
pub mod optimizer;
pub mod planner;
pub mod waypoint;
pub mod config;
pub mod logging;

pub use error::{PlannerError, Result};

//! Haversine matrix backend (offline fallback when no routing service is configured).
//!
//! Uses great-circle distance scaled by a detour coefficient to estimate
//! walking distance and time. Less accurate than a real router (ignores
//! paths) but always available and never metered.

use rayon::prelude::*;

use crate::error::RoutingError;
use crate::matrix::{Cell, Coordinate, TableResponse};
use crate::traits::RoutingBackend;

/// Average walking speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 5.0;

/// Straight-line to street-distance ratio.
const DEFAULT_DETOUR_FACTOR: f64 = 1.3;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average walking speed in km/h.
    pub speed_kmh: f64,
    pub detour_factor: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            detour_factor: DEFAULT_DETOUR_FACTOR,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64, detour_factor: f64) -> Self {
        Self {
            speed_kmh,
            detour_factor,
        }
    }

    /// Calculate haversine distance between two points in kilometers.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    fn walking_meters(&self, from: Coordinate, to: Coordinate) -> f64 {
        Self::haversine_km(from, to) * self.detour_factor * 1000.0
    }

    /// Convert meters to walking time in seconds.
    fn meters_to_seconds(&self, meters: f64) -> f64 {
        let hours = meters / 1000.0 / self.speed_kmh;
        (hours * 3600.0).round()
    }
}

impl RoutingBackend for HaversineMatrix {
    fn name(&self) -> &str {
        "haversine"
    }

    fn metered(&self) -> bool {
        false
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<TableResponse, RoutingError> {
        let distances: Vec<Vec<Cell>> = coordinates
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                coordinates
                    .iter()
                    .enumerate()
                    .map(|(j, to)| {
                        if i == j {
                            Some(0.0)
                        } else {
                            Some(self.walking_meters(*from, *to).round())
                        }
                    })
                    .collect()
            })
            .collect();

        let durations = distances
            .iter()
            .map(|row| {
                row.iter()
                    .map(|meters| meters.map(|m| self.meters_to_seconds(m)))
                    .collect()
            })
            .collect();

        Ok(TableResponse {
            code: Some("Ok".to_string()),
            message: None,
            durations: Some(durations),
            distances: Some(distances),
            raw_body: None,
        })
    }
}

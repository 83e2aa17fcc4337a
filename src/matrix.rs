//! Travel matrix value objects and the routing table wire payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A matrix cell: `None` means the provider found no route for the pair.
pub type Cell = Option<f64>;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// `lng,lat;lng,lat;...` path segment shared by OSRM-style table APIs.
pub fn coordinate_path(coordinates: &[Coordinate]) -> String {
    coordinates
        .iter()
        .map(|c| format!("{:.6},{:.6}", c.lng, c.lat))
        .collect::<Vec<_>>()
        .join(";")
}

/// Body of an OSRM / Mapbox matrix response.
///
/// Unreachable pairs come back as JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub durations: Option<Vec<Vec<Cell>>>,
    pub distances: Option<Vec<Vec<Cell>>>,
    /// Body text as received over HTTP, kept for diagnostics.
    #[serde(skip)]
    pub raw_body: Option<String>,
}

/// Pairwise walking durations (seconds) and distances (meters) over the same
/// ordered list of markers.
///
/// Not assumed symmetric: `distances[i][j]` may differ from `distances[j][i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix {
    durations: Vec<Vec<Cell>>,
    distances: Vec<Vec<Cell>>,
}

impl DistanceMatrix {
    /// Build a matrix, checking that both tables are `n x n` for the same `n`.
    pub fn new(durations: Vec<Vec<Cell>>, distances: Vec<Vec<Cell>>) -> Result<Self, String> {
        let n = durations.len();
        check_square("durations", &durations, n)?;
        check_square("distances", &distances, n)?;
        Ok(Self {
            durations,
            distances,
        })
    }

    /// Validate a provider response for `expected` coordinates.
    pub fn from_response(response: TableResponse, expected: usize) -> Result<Self, String> {
        if let Some(code) = response.code.as_deref() {
            if code != "Ok" {
                let detail = response.message.as_deref().unwrap_or("no message");
                return Err(format!("provider code {code}: {detail}"));
            }
        }

        let durations = response
            .durations
            .ok_or_else(|| "response has no durations".to_string())?;
        let distances = response
            .distances
            .ok_or_else(|| "response has no distances".to_string())?;

        if durations.len() != expected {
            return Err(format!(
                "expected {expected} duration rows, got {}",
                durations.len()
            ));
        }

        Self::new(durations, distances)
    }

    pub fn size(&self) -> usize {
        self.durations.len()
    }

    pub fn durations(&self) -> &[Vec<Cell>] {
        &self.durations
    }

    pub fn distances(&self) -> &[Vec<Cell>] {
        &self.distances
    }

    /// Distance in meters from `from` to `to`, if a route exists.
    pub fn distance(&self, from: usize, to: usize) -> Cell {
        cell(&self.distances, from, to)
    }

    /// Duration in seconds from `from` to `to`, if a route exists.
    pub fn duration(&self, from: usize, to: usize) -> Cell {
        cell(&self.durations, from, to)
    }

    /// The table used to rank candidates for `metric`.
    pub fn costs(&self, metric: Metric) -> &[Vec<Cell>] {
        match metric {
            Metric::Distance => &self.distances,
            Metric::Duration => &self.durations,
        }
    }
}

/// Out-of-range lookups read as "no route".
pub(crate) fn cell(table: &[Vec<Cell>], from: usize, to: usize) -> Cell {
    table.get(from).and_then(|row| row.get(to)).copied().flatten()
}

fn check_square(name: &str, table: &[Vec<Cell>], n: usize) -> Result<(), String> {
    if table.len() != n {
        return Err(format!("{name} has {} rows, expected {n}", table.len()));
    }
    if let Some((i, row)) = table.iter().enumerate().find(|(_, row)| row.len() != n) {
        return Err(format!(
            "{name} row {i} has {} columns, expected {n}",
            row.len()
        ));
    }
    Ok(())
}

/// Which matrix the optimizer minimizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Distance,
    Duration,
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Ok(Metric::Distance),
            "duration" => Ok(Metric::Duration),
            other => Err(format!("unknown metric '{other}' (expected distance or duration)")),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Distance => f.write_str("distance"),
            Metric::Duration => f.write_str("duration"),
        }
    }
}

//! OSRM HTTP adapter for walking travel matrices.

use std::time::Duration;

use tracing::debug;

use crate::error::RoutingError;
use crate::matrix::{Coordinate, TableResponse, coordinate_path};
use crate::traits::RoutingBackend;

/// Both tables are needed: durations for reporting, distances for ordering.
pub(crate) const ANNOTATIONS: &str = "duration,distance";

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "foot".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, RoutingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn table_url(&self, coordinates: &[Coordinate]) -> String {
        format!(
            "{}/table/v1/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coordinate_path(coordinates)
        )
    }
}

impl RoutingBackend for OsrmClient {
    fn name(&self) -> &str {
        "osrm"
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<TableResponse, RoutingError> {
        let url = self.table_url(coordinates);
        debug!(url = %url, "OSRM table request");
        fetch_table(self.client.get(&url).query(&[("annotations", ANNOTATIONS)]))
    }
}

/// Send a table request and decode the body.
///
/// Non-success statuses map to [`RoutingError::Status`]; a success response
/// that is not a table maps to [`RoutingError::Malformed`]. The body text is
/// kept on the decoded response.
pub(crate) fn fetch_table(
    request: reqwest::blocking::RequestBuilder,
) -> Result<TableResponse, RoutingError> {
    let response = request.send()?;
    let status = response.status();
    let body = response.text()?;

    if !status.is_success() {
        return Err(RoutingError::Status {
            status: status.as_u16(),
            body,
        });
    }

    match serde_json::from_str::<TableResponse>(&body) {
        Ok(table) => Ok(TableResponse {
            raw_body: Some(body),
            ..table
        }),
        Err(err) => Err(RoutingError::Malformed {
            reason: format!("invalid table JSON: {err}"),
            status: status.as_u16(),
            body,
        }),
    }
}

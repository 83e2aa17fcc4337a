//! Mapbox Directions Matrix adapter.
//!
//! Mapbox caps a matrix request at 25 coordinates and bills every answered
//! request, which is why the provider puts a quota guard in front of it.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::RoutingError;
use crate::matrix::{Coordinate, TableResponse, coordinate_path};
use crate::osrm::{ANNOTATIONS, fetch_table};
use crate::traits::RoutingBackend;

#[derive(Clone)]
pub struct MapboxConfig {
    pub base_url: String,
    pub profile: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

impl MapboxConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.mapbox.com".to_string(),
            profile: "walking".to_string(),
            access_token: access_token.into(),
            timeout_secs: 10,
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for MapboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapboxConfig")
            .field("base_url", &self.base_url)
            .field("profile", &self.profile)
            .field("access_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MapboxClient {
    config: MapboxConfig,
    client: reqwest::blocking::Client,
}

impl MapboxClient {
    pub fn new(config: MapboxConfig) -> Result<Self, RoutingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn matrix_path(&self, coordinates: &[Coordinate]) -> String {
        format!(
            "{}/directions-matrix/v1/mapbox/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coordinate_path(coordinates)
        )
    }
}

impl RoutingBackend for MapboxClient {
    fn name(&self) -> &str {
        "mapbox"
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<TableResponse, RoutingError> {
        let path = self.matrix_path(coordinates);
        debug!(path = %path, "Mapbox matrix request");

        let request = self.client.get(&path).query(&[
            ("annotations", ANNOTATIONS),
            ("access_token", self.config.access_token.as_str()),
        ]);
        fetch_table(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let config = MapboxConfig::new("pk.secret-token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_matrix_path() {
        let client = MapboxClient::new(MapboxConfig::new("pk.test")).unwrap();
        let path =
            client.matrix_path(&[Coordinate::new(48.85, 2.35), Coordinate::new(48.86, 2.34)]);
        assert_eq!(
            path,
            "https://api.mapbox.com/directions-matrix/v1/mapbox/walking/2.350000,48.850000;2.340000,48.860000"
        );
    }
}

//! Configuration loaded from the environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PlannerError, Result};
use crate::provider::DEFAULT_MAX_BATCH;
use crate::quota::DEFAULT_MONTHLY_LIMIT;

/// Which routing service answers matrix requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mapbox,
    Osrm,
    Haversine,
}

impl FromStr for ProviderKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mapbox" => Ok(ProviderKind::Mapbox),
            "osrm" => Ok(ProviderKind::Osrm),
            "haversine" => Ok(ProviderKind::Haversine),
            other => Err(PlannerError::config(format!(
                "ROUTING_PROVIDER must be mapbox, osrm or haversine (got '{other}')"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Mapbox => "mapbox",
            ProviderKind::Osrm => "osrm",
            ProviderKind::Haversine => "haversine",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct PlannerConfig {
    pub provider: ProviderKind,
    pub mapbox_access_token: Option<String>,
    pub mapbox_base_url: String,
    pub osrm_base_url: String,
    pub timeout_secs: u64,
    pub monthly_limit: u64,
    pub max_batch: usize,
    pub quota_db_path: PathBuf,
}

impl fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("provider", &self.provider)
            .field(
                "mapbox_access_token",
                &self.mapbox_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("mapbox_base_url", &self.mapbox_base_url)
            .field("osrm_base_url", &self.osrm_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("monthly_limit", &self.monthly_limit)
            .field("max_batch", &self.max_batch)
            .field("quota_db_path", &self.quota_db_path)
            .finish()
    }
}

impl PlannerConfig {
    /// Load configuration from environment variables, reading `.env` first
    /// when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mapbox_access_token = get("MAPBOX_ACCESS_TOKEN");

        let provider = match get("ROUTING_PROVIDER") {
            Some(raw) => raw.parse()?,
            None if mapbox_access_token.is_some() => ProviderKind::Mapbox,
            None => ProviderKind::Osrm,
        };

        if provider == ProviderKind::Mapbox && mapbox_access_token.is_none() {
            return Err(PlannerError::config(
                "MAPBOX_ACCESS_TOKEN must be set when ROUTING_PROVIDER=mapbox",
            ));
        }

        let max_batch = parse_or("MATRIX_MAX_BATCH", get("MATRIX_MAX_BATCH"), DEFAULT_MAX_BATCH)?;
        if max_batch < 2 {
            return Err(PlannerError::config("MATRIX_MAX_BATCH must be at least 2"));
        }

        Ok(Self {
            provider,
            mapbox_access_token,
            mapbox_base_url: get("MAPBOX_BASE_URL")
                .unwrap_or_else(|| "https://api.mapbox.com".to_string()),
            osrm_base_url: get("OSRM_URL").unwrap_or_else(|| "http://localhost:5000".to_string()),
            timeout_secs: parse_or("ROUTING_TIMEOUT_SECS", get("ROUTING_TIMEOUT_SECS"), 10)?,
            monthly_limit: parse_or(
                "MATRIX_MONTHLY_LIMIT",
                get("MATRIX_MONTHLY_LIMIT"),
                DEFAULT_MONTHLY_LIMIT,
            )?,
            max_batch,
            quota_db_path: get("QUOTA_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("matrix_quota.db")),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| {
            PlannerError::config(format!("{key} must be a non-negative integer (got '{value}')"))
        }),
    }
}

//! Plain marker type for callers without their own model.

use serde::{Deserialize, Serialize};

use crate::traits::Marker;

/// A marker read from JSON: `{ "id": "...", "lat": 36.1, "lng": -115.1 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub lat: f64,
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: f64,
}

impl Waypoint {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
        }
    }
}

impl Marker for Waypoint {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn location(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

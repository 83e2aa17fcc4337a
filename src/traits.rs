//! Core capability traits for the tour planner.
//!
//! These are intentionally minimal. The surrounding application implements
//! them for its own marker and tour models and picks the concrete routing
//! vendor and quota datastore.

use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::error::{RoutingError, StoreError};
use crate::matrix::{Coordinate, TableResponse};
use crate::optimizer::TourOrder;
use crate::quota::QuotaRecord;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash {}

impl<T> Id for T where T: Clone + Eq + Hash {}

/// A geographic marker that belongs to a tour.
///
/// Markers are read-only inputs; the planner never creates or mutates them.
pub trait Marker {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Location coordinates (lat, lng) in WGS84 decimal degrees.
    fn location(&self) -> (f64, f64);
}

/// An external routing service able to produce a travel matrix.
///
/// The response is indexed by the provided coordinate order. Implementations
/// return `Err` only when the request did not round-trip with a success
/// response, except for [`RoutingError::Malformed`], which signals a
/// successful round-trip whose payload could not be used.
pub trait RoutingBackend {
    /// Vendor name for logging.
    fn name(&self) -> &str;

    /// Whether calls consume the external monthly request budget.
    fn metered(&self) -> bool {
        true
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<TableResponse, RoutingError>;
}

impl<T: RoutingBackend + ?Sized> RoutingBackend for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn metered(&self) -> bool {
        (**self).metered()
    }

    fn table(&self, coordinates: &[Coordinate]) -> Result<TableResponse, RoutingError> {
        (**self).table(coordinates)
    }
}

/// Shared datastore holding one quota row per calendar period.
pub trait QuotaStore {
    /// Read the record for `period`, creating it at count 0 if missing.
    fn record(&self, period: &str) -> Result<QuotaRecord, StoreError>;

    /// Read the record for `period` without creating it or taking a write lock.
    fn peek(&self, period: &str) -> Result<Option<QuotaRecord>, StoreError>;

    /// Atomically add one to the period counter and stamp `at` as the last
    /// call. Returns the new count.
    fn increment(&self, period: &str, at: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Source of wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Persists which markers belong to a tour and in what order.
pub trait TourMembership {
    type TourId;
    type MarkerId: Id;
    type Error: std::error::Error + Send + Sync + 'static;

    fn store_order(
        &mut self,
        tour_id: &Self::TourId,
        order: &TourOrder<Self::MarkerId>,
    ) -> Result<(), Self::Error>;
}

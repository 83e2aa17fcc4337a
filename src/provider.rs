//! Distance/duration matrix provider.
//!
//! Wraps a [`RoutingBackend`] with input validation and the monthly quota
//! gate. No retries happen here; callers decide whether to try again.

use tracing::{debug, error, info, warn};

use crate::error::{PlannerError, Result, RoutingError};
use crate::matrix::{Coordinate, DistanceMatrix};
use crate::quota::QuotaGuard;
use crate::traits::{Marker, QuotaStore, RoutingBackend};

/// Largest coordinate batch the matrix APIs accept.
pub const DEFAULT_MAX_BATCH: usize = 25;

/// Smallest batch that makes an ordering problem.
pub const MIN_BATCH: usize = 2;

pub struct MatrixProvider<B, S> {
    backend: B,
    guard: QuotaGuard<S>,
    max_batch: usize,
}

impl<B, S> MatrixProvider<B, S>
where
    B: RoutingBackend,
    S: QuotaStore,
{
    pub fn new(backend: B, guard: QuotaGuard<S>) -> Self {
        Self {
            backend,
            guard,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch.max(MIN_BATCH);
        self
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn guard(&self) -> &QuotaGuard<S> {
        &self.guard
    }

    /// Fetch the walking matrix for `markers`, indexed in input order.
    pub fn calculate_matrix<M: Marker>(&self, markers: &[M]) -> Result<DistanceMatrix> {
        let coordinates = self.validate(markers)?;
        let metered = self.backend.metered();

        if metered {
            self.guard.check_quota()?;
        }

        debug!(
            backend = self.backend.name(),
            locations = coordinates.len(),
            "requesting travel matrix"
        );

        let response = match self.backend.table(&coordinates) {
            Ok(response) => response,
            Err(err) => {
                log_failure(self.backend.name(), &err);
                if metered && err.consumed_quota() {
                    self.record_failed_call();
                }
                return Err(err.into());
            }
        };

        if metered {
            self.guard.increment_count()?;
        }

        let raw_body = response.raw_body.clone();
        let matrix =
            DistanceMatrix::from_response(response.clone(), coordinates.len()).map_err(|reason| {
                let body = raw_body
                    .unwrap_or_else(|| serde_json::to_string(&response).unwrap_or_default());
                let err = RoutingError::Malformed {
                    reason,
                    status: 200,
                    body,
                };
                log_failure(self.backend.name(), &err);
                err
            })?;

        info!(
            backend = self.backend.name(),
            locations = matrix.size(),
            "travel matrix received"
        );
        Ok(matrix)
    }

    /// Count an answered-but-unusable call. The routing error stays the
    /// reported failure even if the store cannot be updated.
    fn record_failed_call(&self) {
        if let Err(err) = self.guard.increment_count() {
            error!(
                backend = self.backend.name(),
                error = %err,
                "could not record routing quota usage"
            );
        }
    }

    fn validate<M: Marker>(&self, markers: &[M]) -> Result<Vec<Coordinate>> {
        if markers.len() < MIN_BATCH {
            return Err(PlannerError::invalid(format!(
                "at least {MIN_BATCH} markers are required, got {}",
                markers.len()
            )));
        }
        if markers.len() > self.max_batch {
            return Err(PlannerError::invalid(format!(
                "at most {} markers can be routed at once, got {}",
                self.max_batch,
                markers.len()
            )));
        }

        markers
            .iter()
            .enumerate()
            .map(|(index, marker)| {
                let coordinate = Coordinate::from(marker.location());
                if coordinate.is_valid() {
                    Ok(coordinate)
                } else {
                    Err(PlannerError::invalid(format!(
                        "marker {index} has out-of-range coordinates ({}, {})",
                        coordinate.lat, coordinate.lng
                    )))
                }
            })
            .collect()
    }
}

fn log_failure(backend: &str, err: &RoutingError) {
    warn!(
        backend,
        status = err.status(),
        body = err.body().unwrap_or(""),
        error = %err,
        "routing provider failed"
    );
}

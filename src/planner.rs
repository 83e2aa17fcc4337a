//! End-to-end tour optimization: matrix, order, totals.

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{PlannerConfig, ProviderKind};
use crate::error::{PlannerError, Result};
use crate::haversine::HaversineMatrix;
use crate::mapbox::{MapboxClient, MapboxConfig};
use crate::matrix::Metric;
use crate::optimizer::{TourOrder, calculate_total_distance, nearest_neighbor_order};
use crate::osrm::{OsrmClient, OsrmConfig};
use crate::provider::MatrixProvider;
use crate::quota::{QuotaGuard, UsageStats};
use crate::sqlite_store::SqliteQuotaStore;
use crate::traits::{Marker, QuotaStore, RoutingBackend, TourMembership};

/// Backend chosen at runtime from configuration.
pub type DynBackend = Box<dyn RoutingBackend + Send + Sync>;

/// Result of optimizing one tour.
#[derive(Debug, Clone, Serialize)]
pub struct TourPlan<I> {
    pub order: TourOrder<I>,
    pub metric: Metric,
    /// Walking distance along the open path, meters. Unknown legs add zero.
    pub total_distance_m: f64,
    /// Walking time along the open path, seconds. Unknown legs add zero.
    pub total_duration_s: f64,
}

pub struct TourPlanner<B, S> {
    provider: MatrixProvider<B, S>,
    metric: Metric,
}

impl<B, S> TourPlanner<B, S>
where
    B: RoutingBackend,
    S: QuotaStore,
{
    pub fn new(provider: MatrixProvider<B, S>) -> Self {
        Self {
            provider,
            metric: Metric::default(),
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn provider(&self) -> &MatrixProvider<B, S> {
        &self.provider
    }

    pub fn usage_stats(&self) -> Result<UsageStats> {
        self.provider.guard().usage_stats()
    }

    /// Compute a visiting order for `markers`. Either the whole plan is
    /// returned or the operation fails; there is no partial ordering.
    pub fn optimize_tour<M: Marker>(&self, markers: &[M]) -> Result<TourPlan<M::Id>> {
        let matrix = self.provider.calculate_matrix(markers)?;

        let indices = nearest_neighbor_order(markers.len(), matrix.costs(self.metric));
        let total_distance_m = calculate_total_distance(&indices, matrix.distances());
        let total_duration_s = calculate_total_distance(&indices, matrix.durations());
        let order = TourOrder::new(indices.iter().map(|&i| markers[i].id().clone()).collect());

        info!(
            markers = markers.len(),
            metric = %self.metric,
            total_distance_m,
            total_duration_s,
            "tour optimized"
        );

        Ok(TourPlan {
            order,
            metric: self.metric,
            total_distance_m,
            total_duration_s,
        })
    }

    /// Optimize, then hand the order to `membership` for persistence.
    /// Nothing is stored when optimization fails.
    pub fn optimize_and_store<M, T>(
        &self,
        tour_id: &T::TourId,
        markers: &[M],
        membership: &mut T,
    ) -> Result<TourPlan<M::Id>>
    where
        M: Marker,
        T: TourMembership<MarkerId = M::Id>,
    {
        let plan = self.optimize_tour(markers)?;
        membership
            .store_order(tour_id, &plan.order)
            .map_err(|err| {
                warn!(error = %err, "storing tour order failed");
                PlannerError::Membership(Box::new(err))
            })?;
        Ok(plan)
    }
}

/// Build the routing backend named by `config`.
pub fn build_backend(config: &PlannerConfig) -> Result<DynBackend> {
    let backend: DynBackend = match config.provider {
        ProviderKind::Mapbox => {
            let token = config.mapbox_access_token.clone().ok_or_else(|| {
                PlannerError::config("MAPBOX_ACCESS_TOKEN must be set when ROUTING_PROVIDER=mapbox")
            })?;
            Box::new(MapboxClient::new(MapboxConfig {
                base_url: config.mapbox_base_url.clone(),
                timeout_secs: config.timeout_secs,
                ..MapboxConfig::new(token)
            })?)
        }
        ProviderKind::Osrm => Box::new(OsrmClient::new(OsrmConfig {
            base_url: config.osrm_base_url.clone(),
            timeout_secs: config.timeout_secs,
            ..OsrmConfig::default()
        })?),
        ProviderKind::Haversine => Box::new(HaversineMatrix::default()),
    };
    Ok(backend)
}

/// Wire a planner from configuration: backend, SQLite quota store, limits.
pub fn build_planner(config: &PlannerConfig) -> Result<TourPlanner<DynBackend, SqliteQuotaStore>> {
    let backend = build_backend(config)?;
    let store = SqliteQuotaStore::open(&config.quota_db_path)?;
    let guard = QuotaGuard::new(store, config.monthly_limit);
    let provider = MatrixProvider::new(backend, guard).with_max_batch(config.max_batch);
    info!(
        provider = %config.provider,
        monthly_limit = config.monthly_limit,
        max_batch = config.max_batch,
        "tour planner ready"
    );
    Ok(TourPlanner::new(provider))
}

//! Monthly request quota for metered routing providers.
//!
//! One [`QuotaRecord`] per calendar month (`YYYY-MM`, UTC) lives in a shared
//! [`QuotaStore`]. A new month simply addresses a new, zero-initialized row.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{PlannerError, Result, StoreError};
use crate::traits::{Clock, QuotaStore, SystemClock};

/// Default monthly ceiling for matrix requests.
pub const DEFAULT_MONTHLY_LIMIT: u64 = 10_000;

/// Call counter for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaRecord {
    pub period: String,
    pub count: u64,
    pub last_call_at: Option<DateTime<Utc>>,
}

impl QuotaRecord {
    pub fn empty(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            count: 0,
            last_call_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub period: String,
    pub count: u64,
    pub limit: u64,
    pub remaining: u64,
}

/// Period key for `now`, e.g. `2026-10`.
pub fn period_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// Gate in front of a metered provider.
///
/// `check_quota` and `increment_count` are separate calls; two requests racing
/// just under the limit may both pass and overshoot by a little. The increment
/// itself is atomic in the store.
pub struct QuotaGuard<S> {
    store: S,
    limit: u64,
    clock: Box<dyn Clock + Send + Sync>,
}

impl<S: QuotaStore> QuotaGuard<S> {
    pub fn new(store: S, limit: u64) -> Self {
        Self {
            store,
            limit,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_period(&self) -> String {
        period_key(self.clock.now())
    }

    /// Fail with [`PlannerError::QuotaExceeded`] once the period count has
    /// reached the limit.
    pub fn check_quota(&self) -> Result<()> {
        let record = self.store.record(&self.current_period())?;
        if record.count >= self.limit {
            warn!(
                period = %record.period,
                count = record.count,
                limit = self.limit,
                "monthly routing quota exhausted"
            );
            return Err(PlannerError::QuotaExceeded {
                count: record.count,
                limit: self.limit,
            });
        }
        Ok(())
    }

    /// Record one completed provider call. Returns the new count.
    pub fn increment_count(&self) -> Result<u64> {
        let now = self.clock.now();
        let period = period_key(now);
        let count = self.store.increment(&period, now)?;
        debug!(period = %period, count, limit = self.limit, "routing quota incremented");
        Ok(count)
    }

    /// Usage for the current period. Read-only: a period nobody has called in
    /// yet reports zero without creating a row.
    pub fn usage_stats(&self) -> Result<UsageStats> {
        let period = self.current_period();
        let record = self
            .store
            .peek(&period)?
            .unwrap_or_else(|| QuotaRecord::empty(period));
        Ok(UsageStats {
            remaining: self.limit.saturating_sub(record.count),
            period: record.period,
            count: record.count,
            limit: self.limit,
        })
    }
}

/// Process-local store. Only consistent within one process; use
/// [`crate::sqlite_store::SqliteQuotaStore`] when several instances share a budget.
#[derive(Debug, Default)]
pub struct InMemoryQuotaStore {
    records: Mutex<HashMap<String, QuotaRecord>>,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuotaStore for InMemoryQuotaStore {
    fn record(&self, period: &str) -> std::result::Result<QuotaRecord, StoreError> {
        let mut records = self.records.lock();
        Ok(records
            .entry(period.to_string())
            .or_insert_with(|| QuotaRecord::empty(period))
            .clone())
    }

    fn peek(&self, period: &str) -> std::result::Result<Option<QuotaRecord>, StoreError> {
        Ok(self.records.lock().get(period).cloned())
    }

    fn increment(&self, period: &str, at: DateTime<Utc>) -> std::result::Result<u64, StoreError> {
        let mut records = self.records.lock();
        let record = records
            .entry(period.to_string())
            .or_insert_with(|| QuotaRecord::empty(period));
        record.count += 1;
        record.last_call_at = Some(at);
        Ok(record.count)
    }
}

impl<T: QuotaStore + ?Sized> QuotaStore for std::sync::Arc<T> {
    fn record(&self, period: &str) -> std::result::Result<QuotaRecord, StoreError> {
        (**self).record(period)
    }

    fn peek(&self, period: &str) -> std::result::Result<Option<QuotaRecord>, StoreError> {
        (**self).peek(period)
    }

    fn increment(&self, period: &str, at: DateTime<Utc>) -> std::result::Result<u64, StoreError> {
        (**self).increment(period, at)
    }
}

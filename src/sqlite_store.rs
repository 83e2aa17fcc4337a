//! SQLite-backed quota store.
//!
//! Several processes can point at the same database file; each increment is a
//! single upsert statement, so concurrent callers never lose an update.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::error::StoreError;
use crate::quota::QuotaRecord;
use crate::traits::QuotaStore;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_RECORD: &str = "SELECT count, last_call_at FROM matrix_quota WHERE period = ?1";

pub struct SqliteQuotaStore {
    conn: Mutex<Connection>,
}

impl SqliteQuotaStore {
    /// Open (or create) the database at `path` and initialise the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Self::init(conn)
    }

    /// Private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS matrix_quota (
                 period       TEXT PRIMARY KEY,
                 count        INTEGER NOT NULL DEFAULT 0,
                 last_call_at TEXT
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl QuotaStore for SqliteQuotaStore {
    fn record(&self, period: &str) -> Result<QuotaRecord, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT OR IGNORE INTO matrix_quota (period, count) VALUES (?1, 0)",
            params![period],
        )?;

        let row = tx
            .query_row(
                SELECT_RECORD,
                params![period],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;
        tx.commit()?;

        let Some((count, last_call_at)) = row else {
            return Ok(QuotaRecord::empty(period));
        };

        Ok(to_record(period, count, last_call_at))
    }

    fn peek(&self, period: &str) -> Result<Option<QuotaRecord>, StoreError> {
        let conn = self.conn.lock();
        let row = conn
            .query_row(
                SELECT_RECORD,
                params![period],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(count, last_call_at)| to_record(period, count, last_call_at)))
    }

    fn increment(&self, period: &str, at: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut conn = self.conn.lock();
        // IMMEDIATE takes the write lock up front so a stale WAL snapshot
        // cannot fail the upsert; contention waits on the busy timeout.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let count: i64 = tx.query_row(
            "INSERT INTO matrix_quota (period, count, last_call_at) VALUES (?1, 1, ?2)
             ON CONFLICT(period) DO UPDATE
                 SET count = count + 1, last_call_at = excluded.last_call_at
             RETURNING count",
            params![period, at.to_rfc3339()],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(count.max(0) as u64)
    }
}

fn to_record(period: &str, count: i64, last_call_at: Option<String>) -> QuotaRecord {
    QuotaRecord {
        period: period.to_string(),
        count: count.max(0) as u64,
        last_call_at: last_call_at
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)),
    }
}

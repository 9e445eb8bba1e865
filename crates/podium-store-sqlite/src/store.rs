// crates/podium-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Record Store
// Description: Durable RecordStore backed by a single SQLite database.
// Purpose: Persist leaderboard records with conditional upserts and keyset scans.
// Dependencies: podium-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`RecordStore`] using `SQLite`. Operator
//! merge rules are expressed as `INSERT ... ON CONFLICT DO UPDATE ... WHERE`
//! upserts so every submission is a single round-trip; a rejected update
//! returns no row, which the engine resolves by reading the stored record.
//! Keyset listings ride the composite listing index with SQL row values.
//!
//! Writes serialize through one mutex-guarded connection. Deadline behavior
//! is owned here via the `SQLite` busy timeout; the engine supplies all
//! timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use podium_core::Operator;
use podium_core::PageQuery;
use podium_core::QueryOrder;
use podium_core::Record;
use podium_core::RecordStore;
use podium_core::RecordUpsert;
use podium_core::SortOrder;
use podium_core::StoreError;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store, tracked in `user_version`.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Record columns selected by every read path, in [`row_to_record`] order.
const RECORD_COLUMNS: &str = "leaderboard_id, owner_id, username, score, subscore, num_score, \
                              max_num_score, metadata, create_time, update_time, expiry_time";

/// Schema for the record table and its listing/owner indexes.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS leaderboard_record (
    leaderboard_id TEXT NOT NULL,
    owner_id       TEXT NOT NULL,
    username       TEXT,
    score          INTEGER NOT NULL DEFAULT 0,
    subscore       INTEGER NOT NULL DEFAULT 0,
    num_score      INTEGER NOT NULL DEFAULT 1,
    max_num_score  INTEGER NOT NULL DEFAULT 0,
    metadata       TEXT NOT NULL DEFAULT '{}',
    create_time    INTEGER NOT NULL,
    update_time    INTEGER NOT NULL,
    expiry_time    INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (leaderboard_id, owner_id, expiry_time)
);
CREATE INDEX IF NOT EXISTS leaderboard_record_listing_idx
    ON leaderboard_record (leaderboard_id, expiry_time, score, subscore, owner_id);
CREATE INDEX IF NOT EXISTS leaderboard_record_owner_idx
    ON leaderboard_record (owner_id);
";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` record store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with default pragmas for a database path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` record store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Database I/O error.
    #[error("sqlite record store io error: {0}")]
    Io(String),
    /// Schema version does not match this store.
    #[error("sqlite record store schema version mismatch: found {found}, expected {expected}")]
    VersionMismatch {
        /// Version found in the database.
        found: i64,
        /// Version this store expects.
        expected: i64,
    },
    /// Stored data is invalid.
    #[error("sqlite record store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::VersionMismatch { .. } => Self::Invalid(err.to_string()),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable [`RecordStore`] backed by a single `SQLite` database.
///
/// Cheaply cloneable; clones share the underlying connection.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Opens (or creates) a store at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened, the
    /// pragmas cannot be applied, or the schema version does not match.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        let connection = Connection::open(&config.path)
            .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        apply_pragma(&connection, "busy_timeout", &config.busy_timeout_ms.to_string())?;
        apply_pragma(&connection, "journal_mode", config.journal_mode.pragma_value())?;
        apply_pragma(&connection, "synchronous", config.sync_mode.pragma_value())?;
        Self::initialize(connection)
    }

    /// Opens an in-memory store, mainly for tests and examples.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when initialization fails.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        Self::initialize(connection)
    }

    /// Applies schema versioning and creates the schema on first open.
    fn initialize(connection: Connection) -> Result<Self, SqliteStoreError> {
        let found: i64 = connection
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
        match found {
            0 => {
                connection
                    .execute_batch(SCHEMA_SQL)
                    .map_err(|err| SqliteStoreError::Io(err.to_string()))?;
                apply_pragma(&connection, "user_version", &SCHEMA_VERSION.to_string())?;
            }
            SCHEMA_VERSION => {}
            other => {
                return Err(SqliteStoreError::VersionMismatch {
                    found: other,
                    expected: SCHEMA_VERSION,
                });
            }
        }
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }
}

/// Applies a pragma through batch execution, which tolerates pragmas that
/// report their resulting value.
fn apply_pragma(
    connection: &Connection,
    name: &str,
    value: &str,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA {name} = {value};"))
        .map_err(|err| SqliteStoreError::Io(err.to_string()))
}

// ============================================================================
// SECTION: RecordStore Implementation
// ============================================================================

impl RecordStore for SqliteRecordStore {
    fn upsert(&self, write: &RecordUpsert) -> Result<Option<Record>, StoreError> {
        let connection = self.lock()?;
        let sql = upsert_sql(write.operator, write.sort_order);

        let result = match write.operator {
            Operator::Increment | Operator::Decrement => connection
                .query_row(
                    &sql,
                    params![
                        write.leaderboard_id,
                        write.owner_id,
                        write.username,
                        write.score,
                        write.subscore,
                        write.metadata,
                        write.now,
                        write.expiry_time,
                        write.score,
                        write.subscore,
                    ],
                    |row| returned_record(write, row),
                )
                .optional(),
            Operator::Best | Operator::Set => connection
                .query_row(
                    &sql,
                    params![
                        write.leaderboard_id,
                        write.owner_id,
                        write.username,
                        write.score,
                        write.subscore,
                        write.metadata,
                        write.now,
                        write.expiry_time,
                    ],
                    |row| returned_record(write, row),
                )
                .optional(),
        };

        match result {
            Ok(record) => Ok(record),
            // A lost primary-key race is recovered by the caller reading the
            // winning row.
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Ok(None)
            }
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }

    fn get(
        &self,
        leaderboard_id: &str,
        owner_id: &str,
        expiry_time: i64,
    ) -> Result<Option<Record>, StoreError> {
        let connection = self.lock()?;
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM leaderboard_record \
             WHERE leaderboard_id = ?1 AND owner_id = ?2 AND expiry_time = ?3"
        );
        connection
            .query_row(&sql, params![leaderboard_id, owner_id, expiry_time], row_to_record)
            .optional()
            .map_err(|err| StoreError::Io(err.to_string()))
    }

    fn list_page(&self, query: &PageQuery) -> Result<Vec<Record>, StoreError> {
        let connection = self.lock()?;
        let sql = page_sql(query);
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::Io(err.to_string()))?;
        let rows = match &query.boundary {
            Some(boundary) => statement.query_map(
                params![
                    query.leaderboard_id,
                    query.expiry_time,
                    boundary.score,
                    boundary.subscore,
                    boundary.owner_id,
                    limit,
                ],
                row_to_record,
            ),
            None => statement
                .query_map(params![query.leaderboard_id, query.expiry_time, limit], row_to_record),
        }
        .map_err(|err| StoreError::Io(err.to_string()))?;

        rows.collect::<Result<Vec<Record>, _>>().map_err(|err| StoreError::Io(err.to_string()))
    }

    fn list_owners(
        &self,
        leaderboard_id: &str,
        expiry_time: i64,
        owner_ids: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        if owner_ids.is_empty() {
            return Ok(Vec::new());
        }

        let connection = self.lock()?;
        let placeholders: Vec<String> =
            (0..owner_ids.len()).map(|index| format!("?{}", index + 3)).collect();
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM leaderboard_record \
             WHERE leaderboard_id = ?1 AND expiry_time = ?2 \
             AND owner_id IN ({}) ORDER BY owner_id ASC",
            placeholders.join(", ")
        );

        let mut parameters: Vec<&dyn ToSql> = Vec::with_capacity(owner_ids.len() + 2);
        parameters.push(&leaderboard_id);
        parameters.push(&expiry_time);
        for owner_id in owner_ids {
            parameters.push(owner_id);
        }

        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::Io(err.to_string()))?;
        let rows = statement
            .query_map(parameters.as_slice(), row_to_record)
            .map_err(|err| StoreError::Io(err.to_string()))?;
        rows.collect::<Result<Vec<Record>, _>>().map_err(|err| StoreError::Io(err.to_string()))
    }

    fn read_all(&self, owner_id: &str) -> Result<Vec<Record>, StoreError> {
        let connection = self.lock()?;
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM leaderboard_record \
             WHERE owner_id = ?1 ORDER BY leaderboard_id ASC, expiry_time ASC"
        );
        let mut statement =
            connection.prepare(&sql).map_err(|err| StoreError::Io(err.to_string()))?;
        let rows = statement
            .query_map(params![owner_id], row_to_record)
            .map_err(|err| StoreError::Io(err.to_string()))?;
        rows.collect::<Result<Vec<Record>, _>>().map_err(|err| StoreError::Io(err.to_string()))
    }

    fn delete(
        &self,
        leaderboard_id: &str,
        owner_id: &str,
        expiry_time: i64,
    ) -> Result<(), StoreError> {
        let connection = self.lock()?;
        connection
            .execute(
                "DELETE FROM leaderboard_record \
                 WHERE leaderboard_id = ?1 AND owner_id = ?2 AND expiry_time = ?3",
                params![leaderboard_id, owner_id, expiry_time],
            )
            .map_err(|err| StoreError::Io(err.to_string()))?;
        Ok(())
    }

    fn delete_all(&self, owner_id: &str) -> Result<(), StoreError> {
        let mut connection = self.lock()?;
        let tx = connection.transaction().map_err(|err| StoreError::Io(err.to_string()))?;
        tx.execute("DELETE FROM leaderboard_record WHERE owner_id = ?1", params![owner_id])
            .map_err(|err| StoreError::Io(err.to_string()))?;
        tx.commit().map_err(|err| StoreError::Io(err.to_string()))
    }

    fn readiness(&self) -> Result<(), StoreError> {
        let connection = self.lock()?;
        connection
            .query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|err| StoreError::Io(err.to_string()))
    }
}

// ============================================================================
// SECTION: SQL Construction & Row Mapping
// ============================================================================

/// Builds the conditional upsert for an operator under a sort order.
///
/// Update filters mirror the merge table: best only improves values, set
/// skips equal values, increment/decrement skip zero deltas. A filtered
/// update returns no row.
fn upsert_sql(operator: Operator, sort_order: SortOrder) -> String {
    let (op_sql, filter_sql) = match operator {
        Operator::Best => match sort_order {
            SortOrder::Ascending => (
                "score = MIN(leaderboard_record.score, ?4), \
                 subscore = MIN(leaderboard_record.subscore, ?5)",
                "WHERE leaderboard_record.score > ?4 OR leaderboard_record.subscore > ?5",
            ),
            SortOrder::Descending => (
                "score = MAX(leaderboard_record.score, ?4), \
                 subscore = MAX(leaderboard_record.subscore, ?5)",
                "WHERE leaderboard_record.score < ?4 OR leaderboard_record.subscore < ?5",
            ),
        },
        Operator::Set => (
            "score = ?4, subscore = ?5",
            "WHERE leaderboard_record.score <> ?4 OR leaderboard_record.subscore <> ?5",
        ),
        Operator::Increment => (
            "score = leaderboard_record.score + ?9, \
             subscore = leaderboard_record.subscore + ?10",
            "WHERE ?9 <> 0 OR ?10 <> 0",
        ),
        Operator::Decrement => (
            "score = MAX(leaderboard_record.score - ?9, 0), \
             subscore = MAX(leaderboard_record.subscore - ?10, 0)",
            "WHERE ?9 <> 0 OR ?10 <> 0",
        ),
    };

    format!(
        "INSERT INTO leaderboard_record \
         (leaderboard_id, owner_id, username, score, subscore, metadata, \
          create_time, update_time, expiry_time) \
         VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, '{{}}'), ?7, ?7, ?8) \
         ON CONFLICT (leaderboard_id, owner_id, expiry_time) DO UPDATE SET \
         {op_sql}, \
         num_score = leaderboard_record.num_score + 1, \
         metadata = COALESCE(?6, leaderboard_record.metadata), \
         username = COALESCE(?3, leaderboard_record.username), \
         update_time = ?7 \
         {filter_sql} \
         RETURNING username, score, subscore, num_score, max_num_score, metadata, \
                   create_time, update_time"
    )
}

/// Builds the keyset page scan for a query.
fn page_sql(query: &PageQuery) -> String {
    let mut sql = format!(
        "SELECT {RECORD_COLUMNS} FROM leaderboard_record \
         WHERE leaderboard_id = ?1 AND expiry_time = ?2"
    );
    match (query.order, query.boundary.is_some()) {
        (QueryOrder::Ascending, true) => {
            sql.push_str(
                " AND (score, subscore, owner_id) > (?3, ?4, ?5) \
                 ORDER BY score ASC, subscore ASC, owner_id ASC LIMIT ?6",
            );
        }
        (QueryOrder::Ascending, false) => {
            sql.push_str(" ORDER BY score ASC, subscore ASC, owner_id ASC LIMIT ?3");
        }
        (QueryOrder::Descending, true) => {
            sql.push_str(
                " AND (score, subscore, owner_id) < (?3, ?4, ?5) \
                 ORDER BY score DESC, subscore DESC, owner_id DESC LIMIT ?6",
            );
        }
        (QueryOrder::Descending, false) => {
            sql.push_str(" ORDER BY score DESC, subscore DESC, owner_id DESC LIMIT ?3");
        }
    }
    sql
}

/// Maps a full record row selected with [`RECORD_COLUMNS`].
fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        leaderboard_id: row.get(0)?,
        owner_id: row.get(1)?,
        username: row.get(2)?,
        score: row.get(3)?,
        subscore: row.get(4)?,
        num_score: row.get(5)?,
        max_num_score: row.get(6)?,
        metadata: row.get(7)?,
        create_time: row.get(8)?,
        update_time: row.get(9)?,
        expiry_time: row.get(10)?,
        rank: 0,
    })
}

/// Maps the columns of the upsert's `RETURNING` clause onto a record.
fn returned_record(write: &RecordUpsert, row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        leaderboard_id: write.leaderboard_id.clone(),
        owner_id: write.owner_id.clone(),
        username: row.get(0)?,
        score: row.get(1)?,
        subscore: row.get(2)?,
        num_score: row.get(3)?,
        max_num_score: row.get(4)?,
        metadata: row.get(5)?,
        create_time: row.get(6)?,
        update_time: row.get(7)?,
        expiry_time: write.expiry_time,
        rank: 0,
    })
}

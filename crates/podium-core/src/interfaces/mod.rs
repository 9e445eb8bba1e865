// crates/podium-core/src/interfaces/mod.rs
// ============================================================================
// Module: Podium Interfaces
// Description: Backend-agnostic contracts for storage, ranking, and catalogs.
// Purpose: Define the collaborator surfaces consumed by the leaderboard engine.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the engine integrates with its process-wide
//! collaborators without embedding backend details: the record store, the
//! rank index, the definition catalog, and the tournament deadline helper.
//! Implementations are expected to be thread-safe; the engine performs no
//! locking of its own.
//!
//! Every operation takes caller-supplied time where time matters; interface
//! implementations must not read the wall clock on the engine's behalf.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::CatalogCursor;
use crate::core::Leaderboard;
use crate::core::Operator;
use crate::core::Record;
use crate::core::SortOrder;

// ============================================================================
// SECTION: Record Store
// ============================================================================

/// Record store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("record store io error: {0}")]
    Io(String),
    /// Constraint conflict the store could not resolve internally.
    #[error("record store conflict: {0}")]
    Conflict(String),
    /// Store data is invalid or corrupted.
    #[error("record store invalid data: {0}")]
    Invalid(String),
}

/// A submission prepared for the store's conditional upsert.
///
/// # Invariants
/// - `username`/`metadata` of `None` preserve the stored values on update;
///   the engine maps empty submissions to `None` before reaching the store.
/// - `now` stamps `create_time` on insert and `update_time` on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpsert {
    /// Leaderboard the submission targets.
    pub leaderboard_id: String,
    /// Owner submitting the score.
    pub owner_id: String,
    /// Optional display name replacement.
    pub username: Option<String>,
    /// Submitted score (absolute value, or delta for increment/decrement).
    pub score: i64,
    /// Submitted subscore (absolute value, or delta for increment/decrement).
    pub subscore: i64,
    /// Optional metadata replacement.
    pub metadata: Option<String>,
    /// Effective merge operator for this submission.
    pub operator: Operator,
    /// Sort order of the leaderboard, needed by the best operator.
    pub sort_order: SortOrder,
    /// Expiry epoch the record is bound to, `0` for never.
    pub expiry_time: i64,
    /// Caller-supplied current time in unix seconds.
    pub now: i64,
}

/// Boundary row key for keyset pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBoundary {
    /// Boundary row score.
    pub score: i64,
    /// Boundary row subscore.
    pub subscore: i64,
    /// Boundary row owner identifier.
    pub owner_id: String,
}

/// Scan direction for a keyset page.
///
/// # Invariants
/// - `Ascending` returns keys strictly greater than the boundary (when one
///   is supplied) in ascending `(score, subscore, owner_id)` order.
/// - `Descending` returns keys strictly less than the boundary in descending
///   order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
    /// Strictly-greater-than boundary, ascending order.
    Ascending,
    /// Strictly-less-than boundary, descending order.
    Descending,
}

/// One keyset page request over a leaderboard's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Leaderboard to scan.
    pub leaderboard_id: String,
    /// Expiry epoch to scan.
    pub expiry_time: i64,
    /// Optional exclusive boundary key.
    pub boundary: Option<PageBoundary>,
    /// Scan direction.
    pub order: QueryOrder,
    /// Maximum rows to return.
    pub limit: usize,
}

/// Persistent store for leaderboard records.
///
/// Implementations serialize writes on the `(leaderboard_id, owner_id,
/// expiry_time)` primary key and must make ranges on `(score, subscore,
/// owner_id)` under a fixed `(leaderboard_id, expiry_time)` index-supported.
pub trait RecordStore {
    /// Applies a submission upsert-style under the operator's merge rule.
    ///
    /// Returns `Ok(None)` when the key already existed and the operator's
    /// filter rejected the update (including a lost insert race on the
    /// primary key); the caller then reads the winning row as-is. The insert
    /// path stores the submitted values for every operator and starts
    /// `num_score` at 1; accepted updates add 1 to `num_score`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for failures other than a rejected update.
    fn upsert(&self, write: &RecordUpsert) -> Result<Option<Record>, StoreError>;

    /// Reads one record by primary key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn get(
        &self,
        leaderboard_id: &str,
        owner_id: &str,
        expiry_time: i64,
    ) -> Result<Option<Record>, StoreError>;

    /// Returns one keyset page in the requested order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the scan fails.
    fn list_page(&self, query: &PageQuery) -> Result<Vec<Record>, StoreError>;

    /// Reads records for specific owners under one `(leaderboard_id,
    /// expiry_time)`, in ascending owner order; absent owners are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read fails.
    fn list_owners(
        &self,
        leaderboard_id: &str,
        expiry_time: i64,
        owner_ids: &[String],
    ) -> Result<Vec<Record>, StoreError>;

    /// Reads every record for an owner across all leaderboards and expiries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the scan fails.
    fn read_all(&self, owner_id: &str) -> Result<Vec<Record>, StoreError>;

    /// Deletes one record by primary key; deleting an absent record is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete(
        &self,
        leaderboard_id: &str,
        owner_id: &str,
        expiry_time: i64,
    ) -> Result<(), StoreError>;

    /// Deletes every record for an owner, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the delete fails.
    fn delete_all(&self, owner_id: &str) -> Result<(), StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Rank Index
// ============================================================================

/// Always-current rank index over the records of one expiry epoch.
///
/// The engine consumes ranks without scanning the store; production
/// implementations are expected to answer in O(log N). The index owns its
/// internal consistency between the operations below.
pub trait RankIndex {
    /// Returns the owner's 1-based rank, or `0` when unknown.
    fn get(&self, leaderboard_id: &str, expiry_time: i64, owner_id: &str) -> i64;

    /// Publishes a score and returns the owner's rank after insertion.
    fn insert(
        &self,
        leaderboard_id: &str,
        expiry_time: i64,
        sort_order: SortOrder,
        owner_id: &str,
        score: i64,
        subscore: i64,
    ) -> i64;

    /// Removes an owner's entry; removing an absent entry is a no-op.
    fn delete(&self, leaderboard_id: &str, expiry_time: i64, owner_id: &str);

    /// Backfills the `rank` field on each record in place.
    fn fill(&self, leaderboard_id: &str, expiry_time: i64, records: &mut [Record]);
}

// ============================================================================
// SECTION: Leaderboard Catalog
// ============================================================================

/// Catalog listing errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog listing failed.
    #[error("leaderboard catalog error: {0}")]
    Listing(String),
}

/// One page of leaderboard definitions.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    /// Definitions in catalog order.
    pub leaderboards: Vec<Arc<Leaderboard>>,
    /// Resume point for the next page, absent on the final page.
    pub cursor: Option<CatalogCursor>,
}

/// Cache of leaderboard definitions.
pub trait LeaderboardCatalog {
    /// Returns a definition by id, or `None` when absent.
    fn get(&self, leaderboard_id: &str) -> Option<Arc<Leaderboard>>;

    /// Lists definitions whose category falls in `[category_start,
    /// category_end]`, resuming strictly after the cursor's position.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when listing fails.
    fn list(
        &self,
        category_start: u32,
        category_end: u32,
        limit: usize,
        cursor: Option<&CatalogCursor>,
    ) -> Result<CatalogPage, CatalogError>;
}

// ============================================================================
// SECTION: Tournament Clock
// ============================================================================

/// Deadline helper for tournament-flagged leaderboards.
///
/// The engine only consults the definition's tournament flag and the expiry
/// returned here; tournament lifecycle is owned elsewhere.
pub trait TournamentClock {
    /// Returns the tournament's current expiry epoch, or `0` when none
    /// applies.
    fn expiry(&self, leaderboard: &Leaderboard, now: i64) -> i64;
}

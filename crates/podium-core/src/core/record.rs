// crates/podium-core/src/core/record.rs
// ============================================================================
// Module: Leaderboard Records
// Description: Record and record-page shapes returned by listings and writes.
// Purpose: Define the persisted record model independent of any store backend.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A record is one owner's current entry on a leaderboard for a specific
//! expiry epoch. The store keys records on `(leaderboard_id, owner_id,
//! expiry_time)`; the `rank` field is never persisted and is populated from
//! the rank index or the pagination counter on the way out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Record Shapes
// ============================================================================

/// One owner's entry on a leaderboard for a specific expiry epoch.
///
/// # Invariants
/// - At most one record exists per `(leaderboard_id, owner_id, expiry_time)`.
/// - `num_score` is strictly nondecreasing across successful writes.
/// - `expiry_time == 0` denotes a board with no scheduled reset.
/// - `rank == 0` means "not ranked / unknown"; ranks are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Leaderboard the record belongs to.
    pub leaderboard_id: String,
    /// Owner (player or team) identifier.
    pub owner_id: String,
    /// Optional display name.
    pub username: Option<String>,
    /// Primary score value.
    pub score: i64,
    /// Tie-breaking secondary score value.
    pub subscore: i64,
    /// Count of submissions merged into this record.
    pub num_score: i32,
    /// Advisory submission cap, enforced externally.
    pub max_num_score: i32,
    /// Opaque JSON metadata, defaults to `{}`.
    pub metadata: String,
    /// Creation time in unix seconds.
    pub create_time: i64,
    /// Last update time in unix seconds.
    pub update_time: i64,
    /// Expiry epoch in unix seconds, `0` for never.
    pub expiry_time: i64,
    /// 1-based rank under the leaderboard's sort order, `0` when unknown.
    pub rank: i64,
}

/// Result of a listing or haystack operation.
///
/// # Invariants
/// - `records` read best-to-worst under the sort order regardless of the
///   paging direction that produced them.
/// - Cursors, when present, are bound to the listing's `(leaderboard_id,
///   expiry_time)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPage {
    /// Page of records in natural sort order.
    pub records: Vec<Record>,
    /// Records for explicitly requested owners; absent owners are omitted.
    pub owner_records: Vec<Record>,
    /// Cursor continuing toward worse ranks, when more records exist.
    pub next_cursor: Option<String>,
    /// Cursor continuing toward better ranks, when more records exist.
    pub prev_cursor: Option<String>,
}

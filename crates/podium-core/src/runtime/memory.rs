// crates/podium-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Reference Collaborators
// Description: BTreeMap-backed store, rank index, catalog, and clock.
// Purpose: Provide reference implementations for tests and small embeddings.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! These implementations carry the full contract semantics in plain Rust:
//! the store applies the same operator merge rules a relational backend
//! expresses in SQL, and the rank index derives ranks by counting better
//! entries. The rank derivation is O(n); the production contract expects
//! O(log N), so these are reference implementations, not deployment targets.
//!
//! All types are cheaply cloneable handles over shared state, so a test can
//! keep a handle while the engine owns another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::CatalogCursor;
use crate::core::Leaderboard;
use crate::core::Operator;
use crate::core::Record;
use crate::core::SortOrder;
use crate::interfaces::CatalogError;
use crate::interfaces::CatalogPage;
use crate::interfaces::LeaderboardCatalog;
use crate::interfaces::PageQuery;
use crate::interfaces::QueryOrder;
use crate::interfaces::RankIndex;
use crate::interfaces::RecordStore;
use crate::interfaces::RecordUpsert;
use crate::interfaces::StoreError;
use crate::interfaces::TournamentClock;

// ============================================================================
// SECTION: In-Memory Record Store
// ============================================================================

/// Primary key of a stored record.
type RecordKey = (String, String, i64);

/// In-memory [`RecordStore`] with the full operator merge semantics.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<BTreeMap<RecordKey, Record>>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records, across all boards and epochs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Returns true when no records are stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<RecordKey, Record>>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Io("record store mutex poisoned".to_string()))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn upsert(&self, write: &RecordUpsert) -> Result<Option<Record>, StoreError> {
        let mut records = self.lock()?;
        let key =
            (write.leaderboard_id.clone(), write.owner_id.clone(), write.expiry_time);
        match records.entry(key) {
            Entry::Vacant(slot) => {
                let record = Record {
                    leaderboard_id: write.leaderboard_id.clone(),
                    owner_id: write.owner_id.clone(),
                    username: write.username.clone(),
                    score: write.score,
                    subscore: write.subscore,
                    num_score: 1,
                    max_num_score: 0,
                    metadata: write.metadata.clone().unwrap_or_else(|| "{}".to_string()),
                    create_time: write.now,
                    update_time: write.now,
                    expiry_time: write.expiry_time,
                    rank: 0,
                };
                slot.insert(record.clone());
                Ok(Some(record))
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                let Some((score, subscore)) = merge_scores(write, existing.score, existing.subscore)
                else {
                    // Filter rejected the update; the caller reads the row
                    // as-is.
                    return Ok(None);
                };
                existing.score = score;
                existing.subscore = subscore;
                existing.num_score = existing.num_score.saturating_add(1);
                if let Some(metadata) = &write.metadata {
                    existing.metadata = metadata.clone();
                }
                if let Some(username) = &write.username {
                    existing.username = Some(username.clone());
                }
                existing.update_time = write.now;
                Ok(Some(existing.clone()))
            }
        }
    }

    fn get(
        &self,
        leaderboard_id: &str,
        owner_id: &str,
        expiry_time: i64,
    ) -> Result<Option<Record>, StoreError> {
        let records = self.lock()?;
        let key = (leaderboard_id.to_string(), owner_id.to_string(), expiry_time);
        Ok(records.get(&key).cloned())
    }

    fn list_page(&self, query: &PageQuery) -> Result<Vec<Record>, StoreError> {
        let records = self.lock()?;
        let mut rows: Vec<&Record> = records
            .values()
            .filter(|record| {
                record.leaderboard_id == query.leaderboard_id
                    && record.expiry_time == query.expiry_time
            })
            .collect();
        rows.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        match query.order {
            QueryOrder::Ascending => {
                if let Some(boundary) = &query.boundary {
                    let bound =
                        (boundary.score, boundary.subscore, boundary.owner_id.as_str());
                    rows.retain(|record| sort_key(record) > bound);
                }
            }
            QueryOrder::Descending => {
                rows.reverse();
                if let Some(boundary) = &query.boundary {
                    let bound =
                        (boundary.score, boundary.subscore, boundary.owner_id.as_str());
                    rows.retain(|record| sort_key(record) < bound);
                }
            }
        }

        rows.truncate(query.limit);
        Ok(rows.into_iter().cloned().collect())
    }

    fn list_owners(
        &self,
        leaderboard_id: &str,
        expiry_time: i64,
        owner_ids: &[String],
    ) -> Result<Vec<Record>, StoreError> {
        let records = self.lock()?;
        let mut rows: Vec<Record> = records
            .values()
            .filter(|record| {
                record.leaderboard_id == leaderboard_id
                    && record.expiry_time == expiry_time
                    && owner_ids.contains(&record.owner_id)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));
        Ok(rows)
    }

    fn read_all(&self, owner_id: &str) -> Result<Vec<Record>, StoreError> {
        let records = self.lock()?;
        // BTreeMap iteration is keyed (leaderboard, owner, expiry), so the
        // filtered rows arrive ordered by (leaderboard, expiry).
        Ok(records.values().filter(|record| record.owner_id == owner_id).cloned().collect())
    }

    fn delete(
        &self,
        leaderboard_id: &str,
        owner_id: &str,
        expiry_time: i64,
    ) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        let key = (leaderboard_id.to_string(), owner_id.to_string(), expiry_time);
        records.remove(&key);
        Ok(())
    }

    fn delete_all(&self, owner_id: &str) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        records.retain(|_, record| record.owner_id != owner_id);
        Ok(())
    }
}

/// Listing sort key: lexicographic on `(score, subscore, owner_id)`.
fn sort_key(record: &Record) -> (i64, i64, &str) {
    (record.score, record.subscore, record.owner_id.as_str())
}

/// Applies the operator merge rule against an existing row.
///
/// Returns `None` when the operator's filter rejects the update. Arithmetic
/// saturates at the integer bounds; decrement additionally clamps at zero.
fn merge_scores(write: &RecordUpsert, score: i64, subscore: i64) -> Option<(i64, i64)> {
    match write.operator {
        Operator::Best => match write.sort_order {
            SortOrder::Ascending => (score > write.score || subscore > write.subscore)
                .then(|| (score.min(write.score), subscore.min(write.subscore))),
            SortOrder::Descending => (score < write.score || subscore < write.subscore)
                .then(|| (score.max(write.score), subscore.max(write.subscore))),
        },
        Operator::Set => (score != write.score || subscore != write.subscore)
            .then_some((write.score, write.subscore)),
        Operator::Increment => (write.score != 0 || write.subscore != 0).then(|| {
            (score.saturating_add(write.score), subscore.saturating_add(write.subscore))
        }),
        Operator::Decrement => (write.score != 0 || write.subscore != 0).then(|| {
            (
                score.saturating_sub(write.score).max(0),
                subscore.saturating_sub(write.subscore).max(0),
            )
        }),
    }
}

// ============================================================================
// SECTION: In-Memory Rank Index
// ============================================================================

/// One board epoch's entries in the rank index.
#[derive(Debug, Clone)]
struct RankBoard {
    sort_order: SortOrder,
    scores: BTreeMap<String, (i64, i64)>,
}

/// In-memory [`RankIndex`] deriving ranks by counting better entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRankIndex {
    boards: Arc<Mutex<BTreeMap<(String, i64), RankBoard>>>,
}

impl InMemoryRankIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_boards<V>(
        &self,
        apply: impl FnOnce(&mut BTreeMap<(String, i64), RankBoard>) -> V,
        fallback: V,
    ) -> V {
        self.boards.lock().map_or(fallback, |mut boards| apply(&mut boards))
    }
}

impl RankIndex for InMemoryRankIndex {
    fn get(&self, leaderboard_id: &str, expiry_time: i64, owner_id: &str) -> i64 {
        self.with_boards(
            |boards| {
                let key = (leaderboard_id.to_string(), expiry_time);
                boards.get(&key).map_or(0, |board| board_rank(board, owner_id))
            },
            0,
        )
    }

    fn insert(
        &self,
        leaderboard_id: &str,
        expiry_time: i64,
        sort_order: SortOrder,
        owner_id: &str,
        score: i64,
        subscore: i64,
    ) -> i64 {
        self.with_boards(
            |boards| {
                let key = (leaderboard_id.to_string(), expiry_time);
                let board = boards.entry(key).or_insert_with(|| RankBoard {
                    sort_order,
                    scores: BTreeMap::new(),
                });
                board.scores.insert(owner_id.to_string(), (score, subscore));
                board_rank(board, owner_id)
            },
            0,
        )
    }

    fn delete(&self, leaderboard_id: &str, expiry_time: i64, owner_id: &str) {
        self.with_boards(
            |boards| {
                let key = (leaderboard_id.to_string(), expiry_time);
                if let Some(board) = boards.get_mut(&key) {
                    board.scores.remove(owner_id);
                    if board.scores.is_empty() {
                        boards.remove(&key);
                    }
                }
            },
            (),
        );
    }

    fn fill(&self, leaderboard_id: &str, expiry_time: i64, records: &mut [Record]) {
        self.with_boards(
            |boards| {
                let key = (leaderboard_id.to_string(), expiry_time);
                let Some(board) = boards.get(&key) else {
                    return;
                };
                for record in records {
                    record.rank = board_rank(board, &record.owner_id);
                }
            },
            (),
        );
    }
}

/// Derives an owner's 1-based rank by counting strictly better entries.
fn board_rank(board: &RankBoard, owner_id: &str) -> i64 {
    let Some(&(score, subscore)) = board.scores.get(owner_id) else {
        return 0;
    };
    let own = (score, subscore, owner_id);
    let better = board
        .scores
        .iter()
        .filter(|&(other, &(other_score, other_subscore))| {
            let key = (other_score, other_subscore, other.as_str());
            match board.sort_order {
                SortOrder::Ascending => key < own,
                SortOrder::Descending => key > own,
            }
        })
        .count();
    i64::try_from(better).map_or(i64::MAX, |count| count + 1)
}

// ============================================================================
// SECTION: Static Catalog
// ============================================================================

/// Fixed set of leaderboard definitions.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    leaderboards: BTreeMap<String, Arc<Leaderboard>>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, leaderboard: Leaderboard) {
        self.leaderboards.insert(leaderboard.id.clone(), Arc::new(leaderboard));
    }
}

impl LeaderboardCatalog for StaticCatalog {
    fn get(&self, leaderboard_id: &str) -> Option<Arc<Leaderboard>> {
        self.leaderboards.get(leaderboard_id).cloned()
    }

    fn list(
        &self,
        category_start: u32,
        category_end: u32,
        limit: usize,
        cursor: Option<&CatalogCursor>,
    ) -> Result<CatalogPage, CatalogError> {
        let resume_after = cursor.map(|cursor| cursor.resume_id.as_str());
        let mut leaderboards = Vec::new();
        let mut next = None;
        for (id, leaderboard) in &self.leaderboards {
            if leaderboard.category < category_start || leaderboard.category > category_end {
                continue;
            }
            if let Some(resume_after) = resume_after
                && id.as_str() <= resume_after
            {
                continue;
            }
            if leaderboards.len() == limit {
                // One definition beyond the page proves another page exists.
                next = leaderboards.last().map(|last: &Arc<Leaderboard>| CatalogCursor {
                    resume_id: last.id.clone(),
                });
                break;
            }
            leaderboards.push(Arc::clone(leaderboard));
        }
        Ok(CatalogPage {
            leaderboards,
            cursor: next,
        })
    }
}

// ============================================================================
// SECTION: Tournament Clock
// ============================================================================

/// A [`TournamentClock`] for deployments without tournaments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTournaments;

impl TournamentClock for NoTournaments {
    fn expiry(&self, _leaderboard: &Leaderboard, _now: i64) -> i64 {
        0
    }
}

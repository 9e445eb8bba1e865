// crates/podium-core/src/runtime/engine.rs
// ============================================================================
// Module: Leaderboard Engine
// Description: Record writes, listings, haystack windows, and view projection.
// Purpose: Drive the collaborator contracts into the public leaderboard API.
// Dependencies: crate::core, crate::interfaces, log, serde, thiserror
// ============================================================================

//! ## Overview
//! The engine is a short-lived-operation façade over four collaborators: the
//! record store, the rank index, the definition catalog, and the tournament
//! deadline helper. Each operation resolves the leaderboard definition,
//! computes the expiry epoch for the caller-supplied `now`, then performs at
//! most a handful of store round-trips.
//!
//! Validation and authorization short-circuit before any store interaction.
//! The only store failure converted into a success path is the rejected
//! conditional upsert, which the writer resolves by reading the stored row
//! and reporting it unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use log::debug;
use log::error;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::InvalidCursorError;
use crate::core::InvalidOperatorError;
use crate::core::Leaderboard;
use crate::core::LeaderboardList;
use crate::core::LeaderboardView;
use crate::core::OverrideOperator;
use crate::core::Record;
use crate::core::RecordCursor;
use crate::core::RecordPage;
use crate::core::SortOrder;
use crate::core::decode_catalog_cursor;
use crate::core::decode_record_cursor;
use crate::core::encode_catalog_cursor;
use crate::core::encode_record_cursor;
use crate::core::prev_reset;
use crate::interfaces::CatalogError;
use crate::interfaces::LeaderboardCatalog;
use crate::interfaces::PageBoundary;
use crate::interfaces::PageQuery;
use crate::interfaces::QueryOrder;
use crate::interfaces::RankIndex;
use crate::interfaces::RecordStore;
use crate::interfaces::RecordUpsert;
use crate::interfaces::StoreError;
use crate::interfaces::TournamentClock;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Leaderboard engine errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    /// Leaderboard id absent from the definition catalog.
    #[error("leaderboard not found")]
    NotFound,
    /// Direct owner-initiated write to an authoritative leaderboard.
    #[error("leaderboard only allows authoritative submissions")]
    Authoritative,
    /// Malformed cursor, or one bound to a different leaderboard or expiry.
    #[error("leaderboard cursor invalid")]
    InvalidCursor,
    /// Unknown operator override.
    #[error("invalid operator")]
    InvalidOperator,
    /// Store failure, propagated as-is.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Catalog failure, propagated as-is.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<InvalidCursorError> for LeaderboardError {
    fn from(_: InvalidCursorError) -> Self {
        Self::InvalidCursor
    }
}

impl From<InvalidOperatorError> for LeaderboardError {
    fn from(_: InvalidOperatorError) -> Self {
        Self::InvalidOperator
    }
}

// ============================================================================
// SECTION: Callers & Requests
// ============================================================================

/// Identity submitting an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Caller {
    /// Trusted server-side caller; passes the authoritative write gate.
    Server,
    /// A player or team acting on its own behalf.
    Owner(String),
}

impl Caller {
    /// Returns true for trusted server-side callers.
    #[must_use]
    pub const fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }
}

/// A score submission.
///
/// # Invariants
/// - Empty `username`/`metadata` strings are treated as absent and preserve
///   the stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteRequest {
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
    /// Per-submission operator override.
    pub override_operator: OverrideOperator,
}

/// A paginated listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    /// Leaderboard to list.
    pub leaderboard_id: String,
    /// Page size; `None` skips the paginated listing entirely.
    pub limit: Option<usize>,
    /// Continuation cursor from a previous page.
    pub cursor: Option<String>,
    /// Owners to look up in the same epoch, independent of pagination.
    pub owner_ids: Vec<String>,
    /// Non-zero value pins the expiry epoch instead of resolving it.
    pub override_expiry: i64,
}

/// A haystack request: a window of records centered on an owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaystackRequest {
    /// Leaderboard to window.
    pub leaderboard_id: String,
    /// Owner at the center of the window.
    pub owner_id: String,
    /// Continuation cursor; a non-empty value turns this into a plain
    /// listing.
    pub cursor: Option<String>,
    /// Total window size.
    pub limit: usize,
    /// Non-zero value pins the expiry epoch instead of resolving it.
    pub override_expiry: i64,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// The leaderboard engine.
///
/// Generic over its collaborator contracts so hosts can assemble it from the
/// in-memory reference implementations or production backends. Collaborators
/// are expected to be thread-safe; the engine holds no locks and keeps no
/// state of its own.
#[derive(Debug)]
pub struct LeaderboardEngine<S, C, R, T> {
    store: S,
    catalog: C,
    ranks: R,
    tournaments: T,
}

impl<S, C, R, T> LeaderboardEngine<S, C, R, T>
where
    S: RecordStore,
    C: LeaderboardCatalog,
    R: RankIndex,
    T: TournamentClock,
{
    /// Assembles an engine from its collaborators.
    pub const fn new(store: S, catalog: C, ranks: R, tournaments: T) -> Self {
        Self {
            store,
            catalog,
            ranks,
            tournaments,
        }
    }

    /// Applies a score submission and returns the resulting record with its
    /// rank populated.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::NotFound`] for an unknown leaderboard,
    /// [`LeaderboardError::Authoritative`] when an owner writes directly to
    /// an authoritative board, and propagates store failures.
    pub fn write(
        &self,
        caller: &Caller,
        request: &WriteRequest,
        now: i64,
    ) -> Result<Record, LeaderboardError> {
        let leaderboard =
            self.catalog.get(&request.leaderboard_id).ok_or(LeaderboardError::NotFound)?;
        if leaderboard.authoritative && !caller.is_server() {
            return Err(LeaderboardError::Authoritative);
        }

        let expiry_time = leaderboard
            .reset_schedule
            .as_ref()
            .and_then(|schedule| schedule.next_after(now))
            .unwrap_or(0);
        let operator = request.override_operator.resolve(leaderboard.operator);

        let upsert = RecordUpsert {
            leaderboard_id: leaderboard.id.clone(),
            owner_id: request.owner_id.clone(),
            username: non_empty(request.username.as_deref()),
            score: request.score,
            subscore: request.subscore,
            metadata: non_empty(request.metadata.as_deref()),
            operator,
            sort_order: leaderboard.sort_order,
            expiry_time,
            now,
        };

        let (mut record, unchanged) = match self.store.upsert(&upsert) {
            Ok(Some(record)) => (record, false),
            Ok(None) => {
                // The row already existed and the operator's filter rejected
                // the update; the stored record is authoritative as-is.
                let record = self
                    .store
                    .get(&leaderboard.id, &request.owner_id, expiry_time)
                    .inspect_err(|err| {
                        error!("failed to read unchanged leaderboard record: {err}");
                    })?
                    .ok_or_else(|| {
                        StoreError::Invalid("record missing after rejected write".to_string())
                    })?;
                (record, true)
            }
            Err(err) => {
                error!("failed to write leaderboard record: {err}");
                return Err(err.into());
            }
        };

        record.rank = if unchanged {
            self.ranks.get(&leaderboard.id, expiry_time, &request.owner_id)
        } else {
            self.ranks.insert(
                &leaderboard.id,
                expiry_time,
                leaderboard.sort_order,
                &request.owner_id,
                record.score,
                record.subscore,
            )
        };

        Ok(record)
    }

    /// Deletes one owner's record for the current epoch.
    ///
    /// # Errors
    ///
    /// Same guard errors as [`Self::write`]; store failures propagate.
    pub fn delete(
        &self,
        caller: &Caller,
        leaderboard_id: &str,
        owner_id: &str,
        now: i64,
    ) -> Result<(), LeaderboardError> {
        let leaderboard = self.catalog.get(leaderboard_id).ok_or(LeaderboardError::NotFound)?;
        if leaderboard.authoritative && !caller.is_server() {
            return Err(LeaderboardError::Authoritative);
        }

        let expiry_time = leaderboard
            .reset_schedule
            .as_ref()
            .and_then(|schedule| schedule.next_after(now))
            .unwrap_or(0);

        self.store.delete(&leaderboard.id, owner_id, expiry_time).inspect_err(|err| {
            error!("failed to delete leaderboard record: {err}");
        })?;
        self.ranks.delete(&leaderboard.id, expiry_time, owner_id);
        Ok(())
    }

    /// Lists records with keyset pagination and optional owner lookups.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::NotFound`] for an unknown leaderboard,
    /// [`LeaderboardError::InvalidCursor`] for a cursor that fails decoding
    /// or binding validation, and propagates store failures.
    pub fn list(&self, request: &ListRequest, now: i64) -> Result<RecordPage, LeaderboardError> {
        let leaderboard =
            self.catalog.get(&request.leaderboard_id).ok_or(LeaderboardError::NotFound)?;
        let (expiry_time, records_possible) =
            self.resolve_expiry(request.override_expiry, &leaderboard, now);
        if !records_possible {
            // The current epoch already expired; nothing can match.
            return Ok(RecordPage::default());
        }

        let mut page = RecordPage::default();

        if let Some(limit) = request.limit {
            let incoming = decode_record_cursor(
                &leaderboard.id,
                expiry_time,
                request.cursor.as_deref().unwrap_or(""),
            )?;
            let forward = incoming.as_ref().is_none_or(|cursor| cursor.is_next);
            let order = match (leaderboard.sort_order, forward) {
                (SortOrder::Ascending, true) | (SortOrder::Descending, false) => {
                    QueryOrder::Ascending
                }
                (SortOrder::Ascending, false) | (SortOrder::Descending, true) => {
                    QueryOrder::Descending
                }
            };
            let boundary = incoming.as_ref().map(|cursor| PageBoundary {
                score: cursor.score,
                subscore: cursor.subscore,
                owner_id: cursor.owner_id.clone(),
            });

            let mut rows = self
                .store
                .list_page(&PageQuery {
                    leaderboard_id: leaderboard.id.clone(),
                    expiry_time,
                    boundary,
                    order,
                    limit: limit + 1,
                })
                .inspect_err(|err| error!("failed to list leaderboard records: {err}"))?;
            // The probe row only proves more records exist; it is never
            // returned.
            let has_more = rows.len() > limit;
            rows.truncate(limit);

            let mut rank = incoming.as_ref().map_or(0, |cursor| cursor.rank);
            for record in &mut rows {
                if forward {
                    rank += 1;
                } else {
                    rank -= 1;
                }
                record.rank = rank;
            }
            if !forward {
                // Restore natural sort order; ranks travel with their
                // records.
                rows.reverse();
            }

            let (more_next, more_prev) =
                if forward { (has_more, incoming.is_some()) } else { (true, has_more) };
            page.next_cursor = more_next
                .then(|| rows.last())
                .flatten()
                .map(|record| encode_record_cursor(&boundary_cursor(record, true)));
            page.prev_cursor = more_prev
                .then(|| rows.first())
                .flatten()
                .map(|record| encode_record_cursor(&boundary_cursor(record, false)));
            page.records = rows;
        }

        if !request.owner_ids.is_empty() {
            let mut owner_records = self
                .store
                .list_owners(&leaderboard.id, expiry_time, &request.owner_ids)
                .inspect_err(|err| error!("failed to read leaderboard owner records: {err}"))?;
            self.ranks.fill(&leaderboard.id, expiry_time, &mut owner_records);
            page.owner_records = owner_records;
        }

        Ok(page)
    }

    /// Reads every record an owner holds, across all leaderboards and expiry
    /// epochs. Ranks are not populated.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn read_all(&self, owner_id: &str) -> Result<Vec<Record>, LeaderboardError> {
        let records = self.store.read_all(owner_id).inspect_err(|err| {
            error!("failed to read leaderboard records for owner: {err}");
        })?;
        Ok(records)
    }

    /// Deletes every record an owner holds, atomically.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn delete_all(&self, owner_id: &str) -> Result<(), LeaderboardError> {
        self.store.delete_all(owner_id).inspect_err(|err| {
            error!("failed to delete leaderboard records for owner: {err}");
        })?;
        Ok(())
    }

    /// Returns a window of records centered on an owner.
    ///
    /// A non-empty cursor continues a previous window as a plain listing.
    /// An owner without a record for the current epoch yields an empty page.
    ///
    /// # Errors
    ///
    /// Same errors as [`Self::list`].
    pub fn haystack(
        &self,
        request: &HaystackRequest,
        now: i64,
    ) -> Result<RecordPage, LeaderboardError> {
        let leaderboard =
            self.catalog.get(&request.leaderboard_id).ok_or(LeaderboardError::NotFound)?;
        let (expiry_time, records_possible) =
            self.resolve_expiry(request.override_expiry, &leaderboard, now);
        if !records_possible {
            return Ok(RecordPage::default());
        }

        if let Some(cursor) = request.cursor.as_deref()
            && !cursor.is_empty()
        {
            // Continuing a window is a plain listing anchored at the
            // resolved expiry.
            return self.list(
                &ListRequest {
                    leaderboard_id: request.leaderboard_id.clone(),
                    limit: Some(request.limit),
                    cursor: Some(cursor.to_string()),
                    owner_ids: Vec::new(),
                    override_expiry: expiry_time,
                },
                now,
            );
        }

        debug!(
            "leaderboard haystack lookup for owner {} on {}",
            request.owner_id, leaderboard.id
        );
        let Some(owner_record) = self
            .store
            .get(&leaderboard.id, &request.owner_id, expiry_time)
            .inspect_err(|err| error!("failed to read haystack owner record: {err}"))?
        else {
            return Ok(RecordPage::default());
        };

        if request.limit == 1 {
            let mut record = owner_record;
            record.rank = self.ranks.get(&leaderboard.id, expiry_time, &record.owner_id);
            return Ok(RecordPage {
                records: vec![record],
                ..RecordPage::default()
            });
        }

        let boundary = PageBoundary {
            score: owner_record.score,
            subscore: owner_record.subscore,
            owner_id: owner_record.owner_id.clone(),
        };
        let (toward_better, toward_worse) = match leaderboard.sort_order {
            SortOrder::Ascending => (QueryOrder::Descending, QueryOrder::Ascending),
            SortOrder::Descending => (QueryOrder::Ascending, QueryOrder::Descending),
        };

        // Better half, scanned outward from the owner (worst-first), then
        // reversed so the best record leads.
        let mut upper = self
            .store
            .list_page(&PageQuery {
                leaderboard_id: leaderboard.id.clone(),
                expiry_time,
                boundary: Some(boundary.clone()),
                order: toward_better,
                limit: request.limit + 1,
            })
            .inspect_err(|err| error!("failed to list haystack records: {err}"))?;
        let has_next = upper.len() > request.limit;
        upper.truncate(request.limit);
        upper.reverse();
        let upper_len = upper.len();

        // Worse half; a short better half extends the window downward.
        let lower_limit = (request.limit / 2).max(request.limit - upper_len);
        let mut lower = self
            .store
            .list_page(&PageQuery {
                leaderboard_id: leaderboard.id.clone(),
                expiry_time,
                boundary: Some(boundary),
                order: toward_worse,
                limit: lower_limit + 1,
            })
            .inspect_err(|err| error!("failed to list haystack records: {err}"))?;
        let has_prev = lower.len() > lower_limit;
        lower.truncate(lower_limit);

        let mut all = upper;
        all.push(owner_record);
        all.append(&mut lower);

        let mut start = all.len().saturating_sub(request.limit);
        if upper_len < request.limit / 2 {
            // Keep the owner in the lower half of the window when the better
            // half is short.
            start = 0;
        }
        let end = (start + request.limit).min(all.len());
        let mut records: Vec<Record> = all.drain(start..end).collect();

        self.ranks.fill(&leaderboard.id, expiry_time, &mut records);

        // Continuation in either direction reverses the window's outward
        // expansion, hence the inverted direction flags.
        let next_cursor = has_next
            .then(|| records.first())
            .flatten()
            .map(|record| encode_record_cursor(&boundary_cursor(record, false)));
        let prev_cursor = has_prev
            .then(|| records.last())
            .flatten()
            .map(|record| encode_record_cursor(&boundary_cursor(record, true)));

        Ok(RecordPage {
            records,
            owner_records: Vec::new(),
            next_cursor,
            prev_cursor,
        })
    }

    /// Lists leaderboard definitions by category range as public views.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError::InvalidCursor`] for a malformed cursor
    /// and propagates catalog failures.
    pub fn catalog_list(
        &self,
        category_start: u32,
        category_end: u32,
        limit: usize,
        cursor: &str,
        now: i64,
    ) -> Result<LeaderboardList, LeaderboardError> {
        let incoming = decode_catalog_cursor(cursor)?;
        let page = self
            .catalog
            .list(category_start, category_end, limit, incoming.as_ref())
            .inspect_err(|err| error!("failed to list leaderboards: {err}"))?;

        let leaderboards =
            page.leaderboards.iter().map(|leaderboard| project_view(leaderboard, now)).collect();
        let cursor = page.cursor.as_ref().map(encode_catalog_cursor);
        Ok(LeaderboardList {
            leaderboards,
            cursor,
        })
    }

    /// Projects specific definitions into public views, skipping unknown ids
    /// and tournament-flagged boards.
    #[must_use]
    pub fn leaderboards_get(&self, leaderboard_ids: &[String], now: i64) -> Vec<LeaderboardView> {
        leaderboard_ids
            .iter()
            .filter_map(|id| self.catalog.get(id))
            .filter(|leaderboard| !leaderboard.is_tournament)
            .map(|leaderboard| project_view(&leaderboard, now))
            .collect()
    }

    // ========================================================================
    // SECTION: Expiry Resolution
    // ========================================================================

    /// Computes the current epoch's expiry and whether records can exist.
    fn current_expiry(&self, leaderboard: &Leaderboard, now: i64) -> (i64, bool) {
        if leaderboard.is_tournament {
            let expiry_time = self.tournaments.expiry(leaderboard, now);
            if expiry_time != 0 && expiry_time <= now {
                // The tournament already ended; no current-epoch records.
                return (0, false);
            }
            return (expiry_time, true);
        }
        if let Some(schedule) = &leaderboard.reset_schedule {
            return (schedule.next_after(now).unwrap_or(0), true);
        }
        (0, true)
    }

    /// Resolves the effective expiry, honoring a non-zero override
    /// unconditionally.
    fn resolve_expiry(
        &self,
        override_expiry: i64,
        leaderboard: &Leaderboard,
        now: i64,
    ) -> (i64, bool) {
        if override_expiry == 0 {
            return self.current_expiry(leaderboard, now);
        }
        (override_expiry, true)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a continuation cursor keyed on a boundary record.
fn boundary_cursor(record: &Record, is_next: bool) -> RecordCursor {
    RecordCursor {
        is_next,
        leaderboard_id: record.leaderboard_id.clone(),
        expiry_time: record.expiry_time,
        score: record.score,
        subscore: record.subscore,
        owner_id: record.owner_id.clone(),
        rank: record.rank,
    }
}

/// Projects a definition into its public listing shape.
fn project_view(leaderboard: &Leaderboard, now: i64) -> LeaderboardView {
    let (prev, next) = leaderboard.reset_schedule.as_ref().map_or((0, 0), |schedule| {
        (
            prev_reset(now, leaderboard.create_time, schedule),
            schedule.next_after(now).unwrap_or(0),
        )
    });
    LeaderboardView {
        id: leaderboard.id.clone(),
        sort_order: leaderboard.sort_order,
        operator: leaderboard.operator,
        prev_reset: prev,
        next_reset: next,
        metadata: leaderboard.metadata.clone(),
        create_time: leaderboard.create_time,
    }
}

/// Treats empty submissions as absent so stored values are preserved.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(str::to_string)
}

// crates/podium-core/src/lib.rs
// ============================================================================
// Module: Podium Core
// Description: Leaderboard engine core crate.
// Purpose: Expose the domain model, collaborator interfaces, and runtime engine.
// Dependencies: core, interfaces, runtime
// ============================================================================

//! ## Overview
//! podium-core implements the leaderboard engine used by game backends: named
//! scoreboards with best/set/increment/decrement submission semantics,
//! cron-like reset schedules, keyset pagination with opaque cursors, and
//! contextual haystack windows centered on an owner.
//!
//! The crate is split the same way its collaborators are deployed:
//! - [`core`] holds the domain model (definitions, records, schedules,
//!   cursors) with no backend assumptions.
//! - [`interfaces`] defines the contract surfaces for the record store, the
//!   rank index, the definition catalog, and the tournament deadline helper.
//! - [`runtime`] hosts the [`runtime::LeaderboardEngine`] that drives those
//!   contracts, plus in-memory reference implementations for tests and
//!   embedding.
//!
//! The engine never reads wall-clock time; every operation takes `now` (unix
//! seconds) from the caller so behavior stays deterministic and replayable.

pub mod core;
pub mod interfaces;
pub mod runtime;

pub use crate::core::CatalogCursor;
pub use crate::core::InvalidCursorError;
pub use crate::core::InvalidOperatorError;
pub use crate::core::Leaderboard;
pub use crate::core::LeaderboardList;
pub use crate::core::LeaderboardView;
pub use crate::core::Operator;
pub use crate::core::OverrideOperator;
pub use crate::core::Record;
pub use crate::core::RecordCursor;
pub use crate::core::RecordPage;
pub use crate::core::ResetSchedule;
pub use crate::core::ScheduleError;
pub use crate::core::SortOrder;
pub use crate::core::decode_catalog_cursor;
pub use crate::core::decode_record_cursor;
pub use crate::core::encode_catalog_cursor;
pub use crate::core::encode_record_cursor;
pub use crate::core::prev_reset;
pub use crate::interfaces::CatalogError;
pub use crate::interfaces::CatalogPage;
pub use crate::interfaces::LeaderboardCatalog;
pub use crate::interfaces::PageBoundary;
pub use crate::interfaces::PageQuery;
pub use crate::interfaces::QueryOrder;
pub use crate::interfaces::RankIndex;
pub use crate::interfaces::RecordStore;
pub use crate::interfaces::RecordUpsert;
pub use crate::interfaces::StoreError;
pub use crate::interfaces::TournamentClock;

// crates/podium-core/src/core/mod.rs
// ============================================================================
// Module: Podium Domain Model
// Description: Leaderboard definitions, records, schedules, and cursors.
// Purpose: Provide the backend-agnostic data model consumed by the runtime.
// Dependencies: serde, serde_json, base64, cron, chrono
// ============================================================================

//! ## Overview
//! The domain model is deliberately free of storage concerns: definitions are
//! owned by the catalog, records by the store, and the types here only carry
//! the shapes both sides agree on.

pub mod cursor;
pub mod leaderboard;
pub mod record;
pub mod schedule;

pub use cursor::CatalogCursor;
pub use cursor::InvalidCursorError;
pub use cursor::RecordCursor;
pub use cursor::decode_catalog_cursor;
pub use cursor::decode_record_cursor;
pub use cursor::encode_catalog_cursor;
pub use cursor::encode_record_cursor;
pub use leaderboard::InvalidOperatorError;
pub use leaderboard::Leaderboard;
pub use leaderboard::LeaderboardList;
pub use leaderboard::LeaderboardView;
pub use leaderboard::Operator;
pub use leaderboard::OverrideOperator;
pub use leaderboard::SortOrder;
pub use record::Record;
pub use record::RecordPage;
pub use schedule::ResetSchedule;
pub use schedule::ScheduleError;
pub use schedule::prev_reset;

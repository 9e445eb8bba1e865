// crates/podium-store-sqlite/src/lib.rs
// ============================================================================
// Module: Podium SQLite Store
// Description: Durable RecordStore backed by SQLite.
// Purpose: Persist leaderboard records with index-supported keyset listings.
// Dependencies: podium-core, rusqlite
// ============================================================================

//! ## Overview
//! A durable [`podium_core::RecordStore`] over a single SQLite database.
//! Operator merge rules are expressed as conditional upserts so every write
//! is one store round-trip, and listings ride the composite
//! `(leaderboard_id, expiry_time, score, subscore, owner_id)` index.

pub mod store;

pub use store::SqliteJournalMode;
pub use store::SqliteRecordStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;

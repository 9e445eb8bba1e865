// crates/podium-store-sqlite/tests/engine_integration.rs
// ============================================================================
// Module: Engine Over SQLite Integration Tests
// Description: Drives the leaderboard engine against the durable store.
// ============================================================================
//! ## Overview
//! Assembles the engine with the `SQLite` store to confirm the SQL upsert
//! and keyset scans satisfy the same contract the in-memory reference store
//! does: operator semantics, pagination round-trips, and haystack windows.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use podium_core::Leaderboard;
use podium_core::Operator;
use podium_core::SortOrder;
use podium_core::runtime::Caller;
use podium_core::runtime::HaystackRequest;
use podium_core::runtime::InMemoryRankIndex;
use podium_core::runtime::LeaderboardEngine;
use podium_core::runtime::ListRequest;
use podium_core::runtime::NoTournaments;
use podium_core::runtime::StaticCatalog;
use podium_core::runtime::WriteRequest;
use podium_store_sqlite::SqliteRecordStore;

type Engine =
    LeaderboardEngine<SqliteRecordStore, StaticCatalog, InMemoryRankIndex, NoTournaments>;

const NOW: i64 = 1_000_000;

fn engine() -> Engine {
    let mut catalog = StaticCatalog::new();
    catalog.insert(Leaderboard {
        id: "arena".to_string(),
        sort_order: SortOrder::Descending,
        operator: Operator::Best,
        authoritative: false,
        reset_schedule: None,
        metadata: "{}".to_string(),
        create_time: 0,
        category: 0,
        is_tournament: false,
    });
    LeaderboardEngine::new(
        SqliteRecordStore::open_in_memory().expect("open in-memory store"),
        catalog,
        InMemoryRankIndex::new(),
        NoTournaments,
    )
}

fn submit(engine: &Engine, owner_id: &str, score: i64) {
    engine
        .write(
            &Caller::Server,
            &WriteRequest {
                leaderboard_id: "arena".to_string(),
                owner_id: owner_id.to_string(),
                score,
                ..WriteRequest::default()
            },
            NOW,
        )
        .expect("write succeeds");
}

#[test]
fn best_operator_reports_unchanged_through_sql() {
    let engine = engine();
    submit(&engine, "owner-1", 10);

    let unchanged = engine
        .write(
            &Caller::Server,
            &WriteRequest {
                leaderboard_id: "arena".to_string(),
                owner_id: "owner-1".to_string(),
                score: 5,
                ..WriteRequest::default()
            },
            NOW,
        )
        .expect("write succeeds");
    assert_eq!((unchanged.score, unchanged.num_score, unchanged.rank), (10, 1, 1));
}

#[test]
fn pagination_round_trips_over_sql() {
    let engine = engine();
    for index in 1..=6 {
        submit(&engine, &format!("owner-{index}"), 70 - 10 * index);
    }

    let first = engine
        .list(
            &ListRequest {
                leaderboard_id: "arena".to_string(),
                limit: Some(2),
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");
    let second = engine
        .list(
            &ListRequest {
                leaderboard_id: "arena".to_string(),
                limit: Some(2),
                cursor: first.next_cursor.clone(),
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");
    let back = engine
        .list(
            &ListRequest {
                leaderboard_id: "arena".to_string(),
                limit: Some(2),
                cursor: second.prev_cursor.clone(),
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");

    assert_eq!(back.records, first.records);
    assert_eq!(back.next_cursor, first.next_cursor);

    let second_owners: Vec<&str> =
        second.records.iter().map(|record| record.owner_id.as_str()).collect();
    assert_eq!(second_owners, ["owner-3", "owner-4"]);
    assert_eq!(
        second.records.iter().map(|record| record.rank).collect::<Vec<i64>>(),
        [3, 4]
    );
}

#[test]
fn haystack_windows_over_sql() {
    let engine = engine();
    for index in 1..=5 {
        submit(&engine, &format!("owner-{index}"), 60 - 10 * index);
    }

    let window = engine
        .haystack(
            &HaystackRequest {
                leaderboard_id: "arena".to_string(),
                owner_id: "owner-3".to_string(),
                limit: 3,
                ..HaystackRequest::default()
            },
            NOW,
        )
        .expect("haystack succeeds");

    let names: Vec<&str> =
        window.records.iter().map(|record| record.owner_id.as_str()).collect();
    assert_eq!(names, ["owner-2", "owner-3", "owner-4"]);
    assert_eq!(
        window.records.iter().map(|record| record.rank).collect::<Vec<i64>>(),
        [2, 3, 4]
    );
}

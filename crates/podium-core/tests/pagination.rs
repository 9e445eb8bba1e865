// crates/podium-core/tests/pagination.rs
// ============================================================================
// Module: Record Listing Pagination Tests
// Description: Keyset pagination, cursor binding, and owner batch lookups.
// ============================================================================
//! ## Overview
//! Validates the listing engine: forward/backward keyset pagination with
//! rank continuation, backward-page reversal, cursor binding rejection, and
//! the owner batch path.

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
use podium_core::RecordPage;
use podium_core::ResetSchedule;
use podium_core::SortOrder;
use podium_core::TournamentClock;
use podium_core::runtime::Caller;
use podium_core::runtime::InMemoryRankIndex;
use podium_core::runtime::InMemoryRecordStore;
use podium_core::runtime::LeaderboardEngine;
use podium_core::runtime::LeaderboardError;
use podium_core::runtime::ListRequest;
use podium_core::runtime::NoTournaments;
use podium_core::runtime::StaticCatalog;
use podium_core::runtime::WriteRequest;

type Engine =
    LeaderboardEngine<InMemoryRecordStore, StaticCatalog, InMemoryRankIndex, NoTournaments>;

const NOW: i64 = 1_000_000;

fn board(id: &str, sort_order: SortOrder) -> Leaderboard {
    Leaderboard {
        id: id.to_string(),
        sort_order,
        operator: Operator::Set,
        authoritative: false,
        reset_schedule: None,
        metadata: "{}".to_string(),
        create_time: 0,
        category: 0,
        is_tournament: false,
    }
}

fn engine_with(leaderboards: Vec<Leaderboard>) -> Engine {
    let mut catalog = StaticCatalog::new();
    for leaderboard in leaderboards {
        catalog.insert(leaderboard);
    }
    LeaderboardEngine::new(
        InMemoryRecordStore::new(),
        catalog,
        InMemoryRankIndex::new(),
        NoTournaments,
    )
}

fn submit(engine: &Engine, leaderboard_id: &str, owner_id: &str, score: i64) {
    engine
        .write(
            &Caller::Server,
            &WriteRequest {
                leaderboard_id: leaderboard_id.to_string(),
                owner_id: owner_id.to_string(),
                score,
                ..WriteRequest::default()
            },
            NOW,
        )
        .expect("write succeeds");
}

/// Nine owners, owner-1 best (score 90) down to owner-9 worst (score 10).
fn seeded_engine() -> Engine {
    let engine = engine_with(vec![board("arena", SortOrder::Descending)]);
    for index in 1..=9 {
        submit(&engine, "arena", &format!("owner-{index}"), 100 - 10 * index);
    }
    engine
}

fn list(engine: &Engine, limit: usize, cursor: Option<String>) -> RecordPage {
    engine
        .list(
            &ListRequest {
                leaderboard_id: "arena".to_string(),
                limit: Some(limit),
                cursor,
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds")
}

fn owners(page: &RecordPage) -> Vec<&str> {
    page.records.iter().map(|record| record.owner_id.as_str()).collect()
}

fn ranks(page: &RecordPage) -> Vec<i64> {
    page.records.iter().map(|record| record.rank).collect()
}

#[test]
fn first_page_starts_at_rank_one() {
    let engine = seeded_engine();
    let page = list(&engine, 3, None);

    assert_eq!(owners(&page), ["owner-1", "owner-2", "owner-3"]);
    assert_eq!(ranks(&page), [1, 2, 3]);
    assert!(page.next_cursor.is_some());
    assert!(page.prev_cursor.is_none());
}

#[test]
fn forward_pagination_continues_rank_counting() {
    let engine = seeded_engine();
    let first = list(&engine, 3, None);
    let second = list(&engine, 3, first.next_cursor.clone());

    assert_eq!(owners(&second), ["owner-4", "owner-5", "owner-6"]);
    assert_eq!(ranks(&second), [4, 5, 6]);
    assert!(second.next_cursor.is_some());
    assert!(second.prev_cursor.is_some());

    let third = list(&engine, 3, second.next_cursor.clone());
    assert_eq!(owners(&third), ["owner-7", "owner-8", "owner-9"]);
    assert_eq!(ranks(&third), [7, 8, 9]);
    assert!(third.next_cursor.is_none());
    assert!(third.prev_cursor.is_some());
}

#[test]
fn backward_pagination_reproduces_the_previous_page() {
    let engine = seeded_engine();
    let first = list(&engine, 3, None);
    let second = list(&engine, 3, first.next_cursor.clone());

    let back = list(&engine, 3, second.prev_cursor.clone());
    assert_eq!(back.records, first.records);
    assert_eq!(back.next_cursor, first.next_cursor);
    // Nothing precedes the first page.
    assert!(back.prev_cursor.is_none());
}

#[test]
fn backward_pagination_from_the_middle_keeps_both_cursors() {
    let engine = seeded_engine();
    let first = list(&engine, 3, None);
    let second = list(&engine, 3, first.next_cursor.clone());
    let third = list(&engine, 3, second.next_cursor.clone());

    let back = list(&engine, 3, third.prev_cursor.clone());
    assert_eq!(back.records, second.records);
    assert_eq!(back.next_cursor, second.next_cursor);
    assert!(back.prev_cursor.is_some());

    let further_back = list(&engine, 3, back.prev_cursor.clone());
    assert_eq!(further_back.records, first.records);
}

#[test]
fn ranks_are_strictly_monotonic_across_pages() {
    let engine = seeded_engine();
    let mut cursor = None;
    let mut seen = Vec::new();
    loop {
        let page = list(&engine, 4, cursor);
        seen.extend(ranks(&page));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    assert_eq!(seen, (1..=9).collect::<Vec<i64>>());
}

#[test]
fn descending_ties_break_on_larger_owner_id_first() {
    let engine = engine_with(vec![board("arena", SortOrder::Descending)]);
    submit(&engine, "arena", "owner-a", 10);
    submit(&engine, "arena", "owner-b", 10);

    let page = list(&engine, 2, None);
    assert_eq!(owners(&page), ["owner-b", "owner-a"]);
    assert_eq!(ranks(&page), [1, 2]);
}

#[test]
fn ascending_board_lists_lowest_scores_first() {
    let engine = engine_with(vec![board("golf", SortOrder::Ascending)]);
    submit(&engine, "golf", "owner-a", 72);
    submit(&engine, "golf", "owner-b", 68);
    submit(&engine, "golf", "owner-c", 75);

    let page = engine
        .list(
            &ListRequest {
                leaderboard_id: "golf".to_string(),
                limit: Some(10),
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");
    let names: Vec<&str> = page.records.iter().map(|record| record.owner_id.as_str()).collect();
    assert_eq!(names, ["owner-b", "owner-a", "owner-c"]);
    assert_eq!(page.records.iter().map(|record| record.rank).collect::<Vec<i64>>(), [1, 2, 3]);
}

#[test]
fn cursor_bound_to_another_board_is_rejected() {
    let engine = engine_with(vec![
        board("arena", SortOrder::Descending),
        board("other", SortOrder::Descending),
    ]);
    for index in 1..=4 {
        submit(&engine, "arena", &format!("owner-{index}"), 100 - index);
    }

    let cursor = list(&engine, 2, None).next_cursor;
    assert!(cursor.is_some());

    let result = engine.list(
        &ListRequest {
            leaderboard_id: "other".to_string(),
            limit: Some(2),
            cursor,
            ..ListRequest::default()
        },
        NOW,
    );
    assert!(matches!(result, Err(LeaderboardError::InvalidCursor)));
}

#[test]
fn cursor_is_rejected_after_a_reset_rollover() {
    let mut hourly = board("hourly", SortOrder::Descending);
    hourly.reset_schedule = Some(ResetSchedule::parse("0 * * * *").expect("hourly schedule"));
    let engine = engine_with(vec![hourly]);
    for index in 1..=4 {
        submit(&engine, "hourly", &format!("owner-{index}"), 100 - index);
    }

    let request = ListRequest {
        leaderboard_id: "hourly".to_string(),
        limit: Some(2),
        ..ListRequest::default()
    };
    let cursor = engine.list(&request, NOW).expect("list succeeds").next_cursor;
    assert!(cursor.is_some());

    // Two epochs later the expiry no longer matches the cursor's binding.
    let result = engine.list(
        &ListRequest {
            cursor,
            ..request
        },
        NOW + 7_200,
    );
    assert!(matches!(result, Err(LeaderboardError::InvalidCursor)));
}

#[test]
fn garbage_cursor_is_rejected() {
    let engine = seeded_engine();
    let result = engine.list(
        &ListRequest {
            leaderboard_id: "arena".to_string(),
            limit: Some(2),
            cursor: Some("@@not-a-cursor@@".to_string()),
            ..ListRequest::default()
        },
        NOW,
    );
    assert!(matches!(result, Err(LeaderboardError::InvalidCursor)));
}

#[test]
fn owner_batch_returns_ranked_records_and_omits_absent_owners() {
    let engine = seeded_engine();
    let page = engine
        .list(
            &ListRequest {
                leaderboard_id: "arena".to_string(),
                limit: Some(2),
                owner_ids: vec![
                    "owner-5".to_string(),
                    "owner-2".to_string(),
                    "owner-404".to_string(),
                ],
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");

    let batch: Vec<(&str, i64)> = page
        .owner_records
        .iter()
        .map(|record| (record.owner_id.as_str(), record.rank))
        .collect();
    assert_eq!(batch, [("owner-2", 2), ("owner-5", 5)]);
}

#[test]
fn no_limit_skips_the_paginated_listing() {
    let engine = seeded_engine();
    let page = engine
        .list(
            &ListRequest {
                leaderboard_id: "arena".to_string(),
                limit: None,
                owner_ids: vec!["owner-1".to_string()],
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");

    assert!(page.records.is_empty());
    assert!(page.next_cursor.is_none());
    assert_eq!(page.owner_records.len(), 1);
}

#[test]
fn unknown_leaderboard_is_not_found() {
    let engine = seeded_engine();
    let result = engine.list(
        &ListRequest {
            leaderboard_id: "missing".to_string(),
            limit: Some(2),
            ..ListRequest::default()
        },
        NOW,
    );
    assert!(matches!(result, Err(LeaderboardError::NotFound)));
}

#[test]
fn override_expiry_reaches_archived_epochs() {
    let mut hourly = board("hourly", SortOrder::Descending);
    hourly.reset_schedule = Some(ResetSchedule::parse("0 * * * *").expect("hourly schedule"));
    let engine = engine_with(vec![hourly]);
    for index in 1..=3 {
        submit(&engine, "hourly", &format!("owner-{index}"), 100 - index);
    }
    let sealed_expiry = 1_000_800;

    // After the rollover the current epoch is empty...
    let later = NOW + 7_200;
    let current = engine
        .list(
            &ListRequest {
                leaderboard_id: "hourly".to_string(),
                limit: Some(10),
                ..ListRequest::default()
            },
            later,
        )
        .expect("list succeeds");
    assert!(current.records.is_empty());

    // ...but the archived rows remain reachable by pinning their expiry.
    let archived = engine
        .list(
            &ListRequest {
                leaderboard_id: "hourly".to_string(),
                limit: Some(10),
                override_expiry: sealed_expiry,
                ..ListRequest::default()
            },
            later,
        )
        .expect("list succeeds");
    assert_eq!(archived.records.len(), 3);
    assert!(archived.records.iter().all(|record| record.expiry_time == sealed_expiry));
}

// ============================================================================
// SECTION: Tournament Expiry
// ============================================================================

struct FixedDeadline(i64);

impl TournamentClock for FixedDeadline {
    fn expiry(&self, _leaderboard: &Leaderboard, _now: i64) -> i64 {
        self.0
    }
}

#[test]
fn expired_tournament_returns_an_empty_page() {
    let mut cup = board("cup", SortOrder::Descending);
    cup.is_tournament = true;
    let mut catalog = StaticCatalog::new();
    catalog.insert(cup);
    let engine = LeaderboardEngine::new(
        InMemoryRecordStore::new(),
        catalog,
        InMemoryRankIndex::new(),
        FixedDeadline(NOW - 100),
    );

    let page = engine
        .list(
            &ListRequest {
                leaderboard_id: "cup".to_string(),
                limit: Some(10),
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");
    assert_eq!(page, RecordPage::default());
}

#[test]
fn running_tournament_lists_against_its_deadline() {
    let mut cup = board("cup", SortOrder::Descending);
    cup.is_tournament = true;
    let mut catalog = StaticCatalog::new();
    catalog.insert(cup);
    let deadline = NOW + 5_000;
    let engine = LeaderboardEngine::new(
        InMemoryRecordStore::new(),
        catalog,
        InMemoryRankIndex::new(),
        FixedDeadline(deadline),
    );

    // No records exist for the deadline epoch, but the listing succeeds.
    let page = engine
        .list(
            &ListRequest {
                leaderboard_id: "cup".to_string(),
                limit: Some(10),
                ..ListRequest::default()
            },
            NOW,
        )
        .expect("list succeeds");
    assert!(page.records.is_empty());
}

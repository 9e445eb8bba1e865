// crates/podium-core/examples/minimal.rs
// ============================================================================
// Module: Podium Minimal Example
// Description: Minimal end-to-end leaderboard flow using in-memory adapters.
// Purpose: Demonstrate write/list/haystack against the reference collaborators.
// Dependencies: podium-core
// ============================================================================

//! ## Overview
//! Assembles the engine from the in-memory reference collaborators, submits
//! a handful of scores, and walks a listing page plus a haystack window.
//! This example is backend-agnostic and suitable for quick verification.

use podium_core::Leaderboard;
use podium_core::Operator;
use podium_core::SortOrder;
use podium_core::runtime::Caller;
use podium_core::runtime::HaystackRequest;
use podium_core::runtime::InMemoryRankIndex;
use podium_core::runtime::InMemoryRecordStore;
use podium_core::runtime::LeaderboardEngine;
use podium_core::runtime::ListRequest;
use podium_core::runtime::NoTournaments;
use podium_core::runtime::StaticCatalog;
use podium_core::runtime::WriteRequest;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let now = 1_700_000_000;

    let mut catalog = StaticCatalog::new();
    catalog.insert(Leaderboard {
        id: "arena".to_string(),
        sort_order: SortOrder::Descending,
        operator: Operator::Best,
        authoritative: false,
        reset_schedule: None,
        metadata: "{}".to_string(),
        create_time: now,
        category: 0,
        is_tournament: false,
    });

    let engine = LeaderboardEngine::new(
        InMemoryRecordStore::new(),
        catalog,
        InMemoryRankIndex::new(),
        NoTournaments,
    );

    for (owner, score) in [("ada", 90), ("grace", 70), ("edsger", 50), ("alan", 30)] {
        let record = engine.write(
            &Caller::Server,
            &WriteRequest {
                leaderboard_id: "arena".to_string(),
                owner_id: owner.to_string(),
                score,
                ..WriteRequest::default()
            },
            now,
        )?;
        let _ = record;
    }

    let page = engine.list(
        &ListRequest {
            leaderboard_id: "arena".to_string(),
            limit: Some(2),
            ..ListRequest::default()
        },
        now,
    )?;

    let window = engine.haystack(
        &HaystackRequest {
            leaderboard_id: "arena".to_string(),
            owner_id: "edsger".to_string(),
            limit: 3,
            ..HaystackRequest::default()
        },
        now,
    )?;

    let _ = (page, window);
    Ok(())
}

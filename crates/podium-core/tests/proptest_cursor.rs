// crates/podium-core/tests/proptest_cursor.rs
// ============================================================================
// Module: Cursor Codec Property-Based Tests
// Description: Property tests for cursor round-trips and binding rejection.
// Purpose: Detect panics and invariants across wide input ranges.
// ============================================================================

//! Property-based tests for cursor codec invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use podium_core::RecordCursor;
use podium_core::decode_record_cursor;
use podium_core::encode_record_cursor;
use proptest::prelude::*;

fn cursor_strategy() -> impl Strategy<Value = RecordCursor> {
    (
        any::<bool>(),
        "[a-zA-Z0-9_.-]{1,32}",
        any::<i64>(),
        any::<i64>(),
        any::<i64>(),
        ".{0,64}",
        any::<i64>(),
    )
        .prop_map(
            |(is_next, leaderboard_id, expiry_time, score, subscore, owner_id, rank)| {
                RecordCursor {
                    is_next,
                    leaderboard_id,
                    expiry_time,
                    score,
                    subscore,
                    owner_id,
                    rank,
                }
            },
        )
}

proptest! {
    #[test]
    fn encode_decode_round_trips(cursor in cursor_strategy()) {
        let token = encode_record_cursor(&cursor);
        let decoded = decode_record_cursor(&cursor.leaderboard_id, cursor.expiry_time, &token);
        prop_assert_eq!(decoded, Ok(Some(cursor)));
    }

    #[test]
    fn decoding_under_a_different_binding_fails(
        cursor in cursor_strategy(),
        other_id in "[a-zA-Z0-9_.-]{1,32}",
        other_expiry in any::<i64>(),
    ) {
        let token = encode_record_cursor(&cursor);
        if other_id != cursor.leaderboard_id {
            prop_assert!(decode_record_cursor(&other_id, cursor.expiry_time, &token).is_err());
        }
        if other_expiry != cursor.expiry_time {
            prop_assert!(
                decode_record_cursor(&cursor.leaderboard_id, other_expiry, &token).is_err()
            );
        }
    }

    #[test]
    fn decoding_arbitrary_tokens_never_panics(token in ".{0,128}") {
        let _ = decode_record_cursor("arena", 0, &token);
    }
}

// crates/podium-core/src/core/leaderboard.rs
// ============================================================================
// Module: Leaderboard Definitions
// Description: Sort orders, operators, and leaderboard definition shapes.
// Purpose: Define the read-only leaderboard model projected to callers.
// Dependencies: serde, thiserror, crate::core::schedule
// ============================================================================

//! ## Overview
//! A leaderboard definition is owned by the catalog and read-only to the
//! engine. The definition fixes the sort order and default operator for all
//! submissions; submissions may override the operator per write, but never
//! the sort order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::schedule::ResetSchedule;

// ============================================================================
// SECTION: Sort Order & Operators
// ============================================================================

/// Ordering applied lexicographically to `(score, subscore, owner_id)`.
///
/// # Invariants
/// - `Ascending` means lower values rank better; `Descending` the opposite.
/// - Ties on `(score, subscore)` break on `owner_id` in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Lower score is better.
    Ascending,
    /// Higher score is better.
    Descending,
}

impl SortOrder {
    /// Returns true when lower values rank better.
    #[must_use]
    pub const fn is_ascending(self) -> bool {
        matches!(self, Self::Ascending)
    }
}

/// Merge rule applied when a submission meets an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Keep whichever value ranks better under the sort order.
    Best,
    /// Overwrite the stored values.
    Set,
    /// Add the submitted values to the stored values.
    Increment,
    /// Subtract the submitted values, clamped at zero.
    Decrement,
}

/// Unknown operator discriminant on the wire.
///
/// # Invariants
/// - Produced only by [`OverrideOperator::try_from`]; the typed enums cannot
///   hold an invalid operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid operator")]
pub struct InvalidOperatorError;

/// Per-submission operator override.
///
/// # Invariants
/// - `NoOverride` defers to the leaderboard definition's operator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideOperator {
    /// Use the leaderboard's configured operator.
    #[default]
    NoOverride,
    /// Force the best operator for this submission.
    Best,
    /// Force the set operator for this submission.
    Set,
    /// Force the increment operator for this submission.
    Increment,
    /// Force the decrement operator for this submission.
    Decrement,
}

impl OverrideOperator {
    /// Resolves the effective operator for a submission.
    #[must_use]
    pub const fn resolve(self, default: Operator) -> Operator {
        match self {
            Self::NoOverride => default,
            Self::Best => Operator::Best,
            Self::Set => Operator::Set,
            Self::Increment => Operator::Increment,
            Self::Decrement => Operator::Decrement,
        }
    }
}

impl TryFrom<i32> for OverrideOperator {
    type Error = InvalidOperatorError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NoOverride),
            1 => Ok(Self::Best),
            2 => Ok(Self::Set),
            3 => Ok(Self::Increment),
            4 => Ok(Self::Decrement),
            _ => Err(InvalidOperatorError),
        }
    }
}

// ============================================================================
// SECTION: Leaderboard Definition
// ============================================================================

/// A leaderboard definition, owned by the catalog and read-only here.
///
/// # Invariants
/// - `create_time` is the floor for any derived "previous reset" instant.
/// - `reset_schedule` of `None` means the leaderboard never resets and all
///   records carry `expiry_time == 0`.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    /// Stable leaderboard identifier.
    pub id: String,
    /// Ordering applied to records.
    pub sort_order: SortOrder,
    /// Default merge operator for submissions.
    pub operator: Operator,
    /// When true, direct owner-initiated writes are refused.
    pub authoritative: bool,
    /// Optional reset schedule; `None` means the board never resets.
    pub reset_schedule: Option<ResetSchedule>,
    /// Opaque JSON metadata passed through to callers.
    pub metadata: String,
    /// Creation time in unix seconds.
    pub create_time: i64,
    /// Category used by range listings.
    pub category: u32,
    /// Tournament capability flag; alters expiry calculation and hides the
    /// board from plain definition listings.
    pub is_tournament: bool,
}

// ============================================================================
// SECTION: Public Projections
// ============================================================================

/// Public listing shape for a leaderboard definition.
///
/// # Invariants
/// - `prev_reset`/`next_reset` are unix seconds, `0` when unscheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardView {
    /// Stable leaderboard identifier.
    pub id: String,
    /// Ordering applied to records.
    pub sort_order: SortOrder,
    /// Default merge operator for submissions.
    pub operator: Operator,
    /// Previous reset instant, `0` when none applies.
    pub prev_reset: i64,
    /// Next reset instant, `0` when none applies.
    pub next_reset: i64,
    /// Opaque JSON metadata.
    pub metadata: String,
    /// Creation time in unix seconds.
    pub create_time: i64,
}

/// A page of leaderboard definition views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardList {
    /// Projected definitions in catalog order.
    pub leaderboards: Vec<LeaderboardView>,
    /// Continuation cursor, absent on the final page.
    pub cursor: Option<String>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::InvalidOperatorError;
    use super::Operator;
    use super::OverrideOperator;

    #[test]
    fn override_resolves_against_default() {
        assert_eq!(OverrideOperator::NoOverride.resolve(Operator::Best), Operator::Best);
        assert_eq!(OverrideOperator::Set.resolve(Operator::Best), Operator::Set);
        assert_eq!(OverrideOperator::Decrement.resolve(Operator::Increment), Operator::Decrement);
    }

    #[test]
    fn override_wire_discriminants() {
        assert_eq!(OverrideOperator::try_from(0), Ok(OverrideOperator::NoOverride));
        assert_eq!(OverrideOperator::try_from(3), Ok(OverrideOperator::Increment));
        assert_eq!(OverrideOperator::try_from(9), Err(InvalidOperatorError));
        assert_eq!(OverrideOperator::try_from(-1), Err(InvalidOperatorError));
    }
}

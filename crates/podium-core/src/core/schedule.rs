// crates/podium-core/src/core/schedule.rs
// ============================================================================
// Module: Reset Schedules
// Description: Cron-style reset schedule parsing and reset instant math.
// Purpose: Map schedule expressions to next/previous reset instants.
// Dependencies: cron, chrono, thiserror
// ============================================================================

//! ## Overview
//! Reset schedules are cron expressions evaluated in UTC. The engine never
//! reads wall-clock time; callers supply `now` as unix seconds, which keeps
//! reset math deterministic and replayable.
//!
//! The previous reset is derived from the next two future firings: their gap
//! defines the period, and one period before the first firing is taken as
//! the previous reset. For schedules with irregular spacing (calendar
//! months) this is approximate by design; the expression is never re-parsed
//! to infer a period.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use cron::Schedule;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schedule expression errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The expression is not a valid cron schedule.
    #[error("invalid reset schedule {expression:?}: {source}")]
    Parse {
        /// The rejected expression.
        expression: String,
        /// Parser failure for the expression as supplied.
        #[source]
        source: cron::error::Error,
    },
}

// ============================================================================
// SECTION: Reset Schedule
// ============================================================================

/// A parsed reset schedule evaluated in UTC.
///
/// # Invariants
/// - Firing instants form a monotonically increasing sequence.
/// - Classic 5-field expressions are accepted by prepending a seconds field.
#[derive(Debug, Clone)]
pub struct ResetSchedule {
    schedule: Schedule,
    expression: String,
}

impl ResetSchedule {
    /// Parses a cron expression.
    ///
    /// Accepts the 6/7-field form natively and retries 5-field classic
    /// expressions with a zero seconds field prepended.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Parse`] when neither form parses.
    pub fn parse(expression: &str) -> Result<Self, ScheduleError> {
        match Schedule::from_str(expression) {
            Ok(schedule) => Ok(Self {
                schedule,
                expression: expression.to_string(),
            }),
            Err(source) => {
                let padded = format!("0 {expression}");
                Schedule::from_str(&padded)
                    .map(|schedule| Self {
                        schedule,
                        expression: expression.to_string(),
                    })
                    .map_err(|_| ScheduleError::Parse {
                        expression: expression.to_string(),
                        source,
                    })
            }
        }
    }

    /// Returns the expression the schedule was parsed from.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns the first firing strictly after `now`, as unix seconds.
    ///
    /// `None` when the schedule has no future firing; callers treat that as
    /// "never resets".
    #[must_use]
    pub fn next_after(&self, now: i64) -> Option<i64> {
        let at = DateTime::<Utc>::from_timestamp(now, 0)?;
        self.schedule.after(&at).next().map(|firing| firing.timestamp())
    }

    /// Returns up to `n` firings strictly after `now`, as unix seconds.
    #[must_use]
    pub fn next_n_after(&self, now: i64, n: usize) -> Vec<i64> {
        DateTime::<Utc>::from_timestamp(now, 0).map_or_else(Vec::new, |at| {
            self.schedule.after(&at).take(n).map(|firing| firing.timestamp()).collect()
        })
    }
}

// ============================================================================
// SECTION: Reset Instant Math
// ============================================================================

/// Computes the previous reset instant for a schedule, as unix seconds.
///
/// The period is inferred from the gap between the next two future firings
/// and subtracted once from the first. Returns `0` when the derived instant
/// precedes `create_time` or when fewer than two future firings exist.
#[must_use]
pub fn prev_reset(now: i64, create_time: i64, schedule: &ResetSchedule) -> i64 {
    let firings = schedule.next_n_after(now, 2);
    let [first, second] = firings[..] else {
        return 0;
    };

    let period = second - first;
    let prev = first - period;
    if prev < create_time {
        return 0;
    }

    prev
}

// ============================================================================
// SECTION: Tests
// ============================================================================

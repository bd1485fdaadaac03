//! Streak recomputation and completion-rate aggregation.
//!
//! # Responsibility
//! - Rebuild `current_streak` / `longest_streak` / `last_done_date` from the
//!   full ascending history of successful entry dates.
//! - Derive the 30-day trailing completion percentage.
//!
//! # Invariants
//! - Full recompute, never incremental: the result depends only on the rule,
//!   the stored longest streak and the date history.
//! - `longest_streak` never decreases, even when entries were deleted since
//!   the previous recomputation.

use chrono::{Duration, NaiveDate};

use crate::model::habit::FrequencyRule;
use crate::streak::frequency::{count_expected, expected_next_date};

/// Trailing window length for the completion rate, in days back from today.
const COMPLETION_WINDOW_DAYS: i64 = 30;

/// Result of one streak recomputation, ready to be stored on the habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakState {
    /// Length of the run ending at the most recent successful entry; 0 when
    /// no successful entries exist.
    pub current_streak: u32,
    /// Historical maximum run length, merged with the previously stored one.
    pub longest_streak: u32,
    /// Most recent successful entry date, if any.
    pub last_done_date: Option<NaiveDate>,
}

/// Rebuilds streak state from scratch.
///
/// `dates` must be the successful-entry dates in ascending order; dates are
/// unique per habit so ties cannot occur. A successful entry always counts
/// as a run of at least 1: both a gap and an anomalous earlier-than-expected
/// date reset the run to 1, never to 0.
pub fn recompute_streak(
    rule: &FrequencyRule,
    stored_longest: u32,
    dates: &[NaiveDate],
) -> StreakState {
    let mut current_run = 0u32;
    let mut longest_run = 0u32;
    let mut prev_date: Option<NaiveDate> = None;

    for &date in dates {
        current_run = match prev_date {
            None => 1,
            Some(prev) if date == expected_next_date(rule, prev) => current_run + 1,
            Some(_) => 1,
        };
        longest_run = longest_run.max(current_run);
        prev_date = Some(date);
    }

    StreakState {
        current_streak: current_run,
        longest_streak: stored_longest.max(longest_run),
        last_done_date: prev_date,
    }
}

/// Start of the trailing completion window ending at `today`, inclusive on
/// both ends. Callers counting actual entries must use the same window.
pub fn completion_window_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(COMPLETION_WINDOW_DAYS)
}

/// Computes the trailing completion percentage over `[today - 30d, today]`.
///
/// `successful_in_window` is the count of successful entries whose date
/// falls inside the window. The rate is clamped to 100 so a loosened
/// frequency never reports an over-complete habit, and is 0 when no
/// occurrences were expected.
pub fn completion_rate(rule: &FrequencyRule, today: NaiveDate, successful_in_window: u32) -> f64 {
    let window_start = completion_window_start(today);
    let expected = count_expected(rule, window_start, today);
    if expected == 0 {
        return 0.0;
    }
    (f64::from(successful_in_window) / f64::from(expected) * 100.0).min(100.0)
}

//! Frequency rule evaluator.
//!
//! # Responsibility
//! - `expected_next_date`: the next date a habit is expected after a given
//!   occurrence.
//! - `count_expected`: expected occurrences over an inclusive date range.
//!
//! # Invariants
//! - An empty custom weekday set behaves as `Daily`.
//! - `count_expected` returns 0 for every rule when `start > end`.

use chrono::{Datelike, Duration, NaiveDate};

use crate::model::habit::FrequencyRule;

/// Returns the next date on which the habit is expected, given the previous
/// occurrence date.
///
/// # Contract
/// - `Daily`: the following day.
/// - `EveryNDays(n)`: `prev_date + max(1, n)` days.
/// - `Weekdays`: the next Monday-to-Friday day after `prev_date`.
/// - `Custom(set)`: the next day whose weekday index is in the set, scanning
///   at most one full week; an empty set (or no hit within a week) falls
///   back to the following day.
pub fn expected_next_date(rule: &FrequencyRule, prev_date: NaiveDate) -> NaiveDate {
    match rule {
        FrequencyRule::Daily => prev_date + Duration::days(1),
        FrequencyRule::EveryNDays(interval) => {
            prev_date + Duration::days(i64::from((*interval).max(1)))
        }
        FrequencyRule::Weekdays => {
            let mut next = prev_date + Duration::days(1);
            while weekday_index(next) >= 5 {
                next += Duration::days(1);
            }
            next
        }
        FrequencyRule::Custom(days) => {
            if days.is_empty() {
                return prev_date + Duration::days(1);
            }
            let mut next = prev_date + Duration::days(1);
            for _ in 0..7 {
                if days.contains(&weekday_index(next)) {
                    return next;
                }
                next += Duration::days(1);
            }
            prev_date + Duration::days(1)
        }
    }
}

/// Counts how many occurrences were expected in `[start, end]` inclusive.
///
/// Returns 0 when `start > end`. `EveryNDays` uses floor division clamped to
/// at least one occurrence for any non-empty range.
pub fn count_expected(rule: &FrequencyRule, start: NaiveDate, end: NaiveDate) -> u32 {
    if start > end {
        return 0;
    }
    let span_days = (end - start).num_days() + 1;
    match rule {
        FrequencyRule::Daily => span_days as u32,
        FrequencyRule::Weekdays => count_matching_days(start, end, |date| weekday_index(date) < 5),
        FrequencyRule::EveryNDays(interval) => {
            (span_days / i64::from((*interval).max(1))).max(1) as u32
        }
        FrequencyRule::Custom(days) => {
            if days.is_empty() {
                return span_days as u32;
            }
            count_matching_days(start, end, |date| days.contains(&weekday_index(date)))
        }
    }
}

/// Weekday index with 0=Mon..6=Sun, matching the custom-day encoding.
pub(crate) fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

fn count_matching_days(
    start: NaiveDate,
    end: NaiveDate,
    matches: impl Fn(NaiveDate) -> bool,
) -> u32 {
    let mut count = 0;
    let mut current = start;
    while current <= end {
        if matches(current) {
            count += 1;
        }
        current += Duration::days(1);
    }
    count
}

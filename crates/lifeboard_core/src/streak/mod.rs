//! Pure streak arithmetic: frequency evaluation, run recomputation and the
//! trailing completion rate.
//!
//! # Responsibility
//! - Answer "when is this habit next expected?" and "how many occurrences
//!   were expected in a range?" for every frequency rule.
//! - Rebuild streak state from a full successful-entry history.
//!
//! # Invariants
//! - No I/O and no clock access; callers pass dates in explicitly.
//! - Recomputation is deterministic for a given rule and date history.

pub mod compute;
pub mod frequency;

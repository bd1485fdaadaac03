//! Domain model for the habit / journal / vision suite.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep streak state as plain stored fields; it is only mutated through
//!   the recomputation path in the streak module.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - At most one habit entry exists per `(habit, date)` pair; the storage
//!   layer enforces this.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entry;
pub mod habit;
pub mod journal;
pub mod vision;

/// Domain-level validation failure raised before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Habit name is empty or whitespace-only.
    BlankHabitName,
    /// `FrequencyRule::EveryNDays` configured with a zero interval.
    ZeroDayInterval,
    /// Custom weekday index outside `0..=6`.
    WeekdayIndexOutOfRange(u8),
    /// Vision item title is empty or whitespace-only.
    BlankVisionTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankHabitName => write!(f, "habit name cannot be blank"),
            Self::ZeroDayInterval => write!(f, "every-n-days interval must be at least 1"),
            Self::WeekdayIndexOutOfRange(index) => {
                write!(f, "weekday index {index} is out of range 0..=6")
            }
            Self::BlankVisionTitle => write!(f, "vision title cannot be blank"),
        }
    }
}

impl Error for ValidationError {}

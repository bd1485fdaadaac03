//! Habit domain model.
//!
//! # Responsibility
//! - Define the recurring-activity record and its frequency rule.
//! - Carry derived streak state (`current_streak`, `longest_streak`,
//!   `last_done_date`) as stored fields.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another habit.
//! - Streak fields are only written by the recomputation path; user actions
//!   reach them exclusively through entry mutations.
//! - `longest_streak` never decreases across recomputations.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ValidationError;

/// Stable identifier for a habit definition.
pub type HabitId = Uuid;

/// Visual color theme for board rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTheme {
    Purple,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
    Pink,
    Teal,
}

impl ColorTheme {
    /// Maps the theme to the kanban palette integer used by board views.
    pub fn palette_index(self) -> u8 {
        match self {
            Self::Purple => 9,
            Self::Blue => 4,
            Self::Green => 10,
            Self::Yellow => 3,
            Self::Orange => 2,
            Self::Red => 1,
            Self::Pink => 6,
            Self::Teal => 5,
        }
    }
}

/// Recurrence policy determining on which calendar days a habit is expected.
///
/// `Custom` carries weekday indices 0=Mon..6=Sun. An empty custom set is
/// treated as `Daily` by the evaluator rather than rejected, so persisted
/// rows with a garbled day list degrade instead of breaking check-ins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyRule {
    Daily,
    Weekdays,
    EveryNDays(u32),
    Custom(BTreeSet<u8>),
}

/// Recurring-activity definition with derived streak state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Stable global ID used for entry ownership and auditing.
    pub uuid: HabitId,
    /// Owner reference; access control is a host concern, only the value is
    /// kept here.
    pub owner: String,
    /// Display name. Must not be blank.
    pub name: String,
    /// Emoji icon shown next to the name.
    pub icon: String,
    /// Color theme for board rendering.
    pub color: ColorTheme,
    /// Display order within the owner's board.
    pub sequence: i64,
    /// Inactive habits are hidden from default listings but keep history.
    pub active: bool,
    /// Informational target count per occurrence.
    pub goal: u32,
    /// Recurrence rule evaluated by the streak module.
    pub frequency: FrequencyRule,
    /// Length of the run ending at the most recent successful entry.
    pub current_streak: u32,
    /// Maximum run length ever observed. Monotonically non-decreasing.
    pub longest_streak: u32,
    /// Date of the most recent successful entry, if any.
    pub last_done_date: Option<NaiveDate>,
}

impl Habit {
    /// Creates a new habit with a generated stable ID and default settings.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner, name)
    }

    /// Creates a new habit with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(uuid: HabitId, owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid,
            owner: owner.into(),
            name: name.into(),
            icon: "✨".to_string(),
            color: ColorTheme::Purple,
            sequence: 10,
            active: true,
            goal: 1,
            frequency: FrequencyRule::Daily,
            current_streak: 0,
            longest_streak: 0,
            last_done_date: None,
        }
    }

    /// Checks domain invariants before persistence.
    ///
    /// # Errors
    /// - `BlankHabitName` when the name is empty or whitespace-only.
    /// - `ZeroDayInterval` for `EveryNDays(0)`.
    /// - `WeekdayIndexOutOfRange` for custom indices above 6.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankHabitName);
        }
        match &self.frequency {
            FrequencyRule::EveryNDays(0) => Err(ValidationError::ZeroDayInterval),
            FrequencyRule::Custom(days) => match days.iter().find(|day| **day > 6) {
                Some(bad) => Err(ValidationError::WeekdayIndexOutOfRange(*bad)),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ColorTheme, FrequencyRule, Habit};
    use crate::model::ValidationError;
    use std::collections::BTreeSet;

    #[test]
    fn new_habit_defaults_match_contract() {
        let habit = Habit::new("alice", "Meditate");
        assert_eq!(habit.icon, "✨");
        assert_eq!(habit.color, ColorTheme::Purple);
        assert_eq!(habit.frequency, FrequencyRule::Daily);
        assert_eq!(habit.current_streak, 0);
        assert_eq!(habit.longest_streak, 0);
        assert!(habit.last_done_date.is_none());
        assert!(habit.active);
    }

    #[test]
    fn validate_rejects_blank_name() {
        let habit = Habit::new("alice", "   ");
        assert_eq!(habit.validate(), Err(ValidationError::BlankHabitName));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut habit = Habit::new("alice", "Stretch");
        habit.frequency = FrequencyRule::EveryNDays(0);
        assert_eq!(habit.validate(), Err(ValidationError::ZeroDayInterval));
    }

    #[test]
    fn validate_rejects_out_of_range_weekday() {
        let mut habit = Habit::new("alice", "Run");
        habit.frequency = FrequencyRule::Custom(BTreeSet::from([0, 7]));
        assert_eq!(
            habit.validate(),
            Err(ValidationError::WeekdayIndexOutOfRange(7))
        );
    }

    #[test]
    fn frequency_rule_serializes_with_snake_case_tags() {
        let json = serde_json::to_string(&FrequencyRule::EveryNDays(3)).unwrap();
        assert_eq!(json, r#"{"every_n_days":3}"#);
        let parsed: FrequencyRule = serde_json::from_str(r#""weekdays""#).unwrap();
        assert_eq!(parsed, FrequencyRule::Weekdays);
    }

    #[test]
    fn palette_index_covers_all_themes() {
        let indices: Vec<u8> = [
            ColorTheme::Purple,
            ColorTheme::Blue,
            ColorTheme::Green,
            ColorTheme::Yellow,
            ColorTheme::Orange,
            ColorTheme::Red,
            ColorTheme::Pink,
            ColorTheme::Teal,
        ]
        .into_iter()
        .map(ColorTheme::palette_index)
        .collect();
        assert_eq!(indices, vec![9, 4, 10, 3, 2, 1, 6, 5]);
    }
}

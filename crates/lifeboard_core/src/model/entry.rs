//! Habit check-in entry model.
//!
//! # Invariants
//! - At most one entry per `(habit, date)`; enforced by the storage layer.
//! - Every create, every write to `success` or `date`, and every delete
//!   triggers recomputation of the owning habit's streak state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::habit::HabitId;

/// Stable identifier for a habit entry.
pub type EntryId = Uuid;

/// One check-in record for a habit on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitEntry {
    /// Stable global ID.
    pub uuid: EntryId,
    /// Owning habit. Deleting the habit cascades to its entries.
    pub habit_id: HabitId,
    /// Owner reference, mirrored from the habit at creation time.
    pub owner: String,
    /// Calendar day of the check-in.
    pub date: NaiveDate,
    /// Whether the habit was completed on `date`.
    pub success: bool,
    /// Free-text note attached to the check-in.
    pub note: Option<String>,
}

impl HabitEntry {
    /// Creates a successful check-in with a generated stable ID.
    pub fn new(habit_id: HabitId, owner: impl Into<String>, date: NaiveDate) -> Self {
        Self::with_id(Uuid::new_v4(), habit_id, owner, date)
    }

    /// Creates a successful check-in with a caller-provided stable ID.
    pub fn with_id(
        uuid: EntryId,
        habit_id: HabitId,
        owner: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            uuid,
            habit_id,
            owner: owner.into(),
            date,
            success: true,
            note: None,
        }
    }
}

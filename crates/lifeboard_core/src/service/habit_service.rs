//! Habit use-case service.
//!
//! # Responsibility
//! - Entry mutations (create/update/delete) with synchronous streak
//!   recomputation scoped to the affected habits.
//! - Quick check-in toggle for today.
//! - Completion-rate reads and the full-recompute consistency sweep.
//!
//! # Invariants
//! - Recomputation runs in-line with the mutation that caused it, once per
//!   distinct affected habit.
//! - A recomputation failure never fails the triggering mutation; it is
//!   logged and the streak fields stay stale until the next successful
//!   recomputation (availability over consistency).

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use log::{info, warn};

use crate::model::entry::{EntryId, HabitEntry};
use crate::model::habit::{Habit, HabitId};
use crate::repo::entry_repo::{EntryListQuery, EntryRepository};
use crate::repo::habit_repo::{HabitListQuery, HabitRepository};
use crate::repo::RepoError;
use crate::streak::compute::{
    completion_rate, completion_window_start, recompute_streak, StreakState,
};

/// Service error for habit use-cases.
#[derive(Debug)]
pub enum HabitServiceError {
    /// Target habit does not exist.
    HabitNotFound(HabitId),
    /// Target entry does not exist.
    EntryNotFound(EntryId),
    /// A second entry for the same `(habit, date)` pair was rejected.
    DuplicateEntry { habit_id: HabitId, date: NaiveDate },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::EntryNotFound(id) => write!(f, "habit entry not found: {id}"),
            Self::DuplicateEntry { habit_id, date } => write!(
                f,
                "an entry already exists for habit {habit_id} on {date}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent habit state: {details}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateEntry { habit_id, date } => {
                Self::DuplicateEntry { habit_id, date }
            }
            other => Self::Repo(other),
        }
    }
}

/// Outcome of the consistency sweep across all habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Habits whose streak state was rebuilt.
    pub recomputed: u32,
    /// Habits skipped because their recomputation failed.
    pub failed: u32,
}

/// Habit service facade over habit and entry repositories.
pub struct HabitService<H: HabitRepository, E: EntryRepository> {
    habits: H,
    entries: E,
}

impl<H: HabitRepository, E: EntryRepository> HabitService<H, E> {
    /// Creates a service using the provided repository implementations.
    pub fn new(habits: H, entries: E) -> Self {
        Self { habits, entries }
    }

    /// Creates a new habit definition.
    pub fn create_habit(&self, habit: &Habit) -> Result<HabitId, HabitServiceError> {
        Ok(self.habits.create_habit(habit)?)
    }

    /// Updates a habit's definition fields. Streak state is untouched; a
    /// changed frequency rule only takes effect at the next recomputation.
    pub fn update_habit(&self, habit: &Habit) -> Result<(), HabitServiceError> {
        Ok(self.habits.update_habit(habit)?)
    }

    /// Gets one habit by stable ID.
    pub fn get_habit(&self, id: HabitId) -> Result<Option<Habit>, HabitServiceError> {
        Ok(self.habits.get_habit(id)?)
    }

    /// Lists habits using owner/active filters, ordered by sequence.
    pub fn list_habits(&self, query: &HabitListQuery) -> Result<Vec<Habit>, HabitServiceError> {
        Ok(self.habits.list_habits(query)?)
    }

    /// Deletes a habit; its entries are removed by the storage cascade, so
    /// no recomputation is needed afterwards.
    pub fn delete_habit(&self, id: HabitId) -> Result<(), HabitServiceError> {
        Ok(self.habits.delete_habit(id)?)
    }

    /// Creates a check-in entry and recomputes the owning habit's streak.
    ///
    /// # Contract
    /// - Duplicate `(habit, date)` surfaces as `DuplicateEntry`.
    /// - The entry mutation commits even when recomputation fails.
    pub fn record_entry(&self, entry: &HabitEntry) -> Result<HabitEntry, HabitServiceError> {
        if self.habits.get_habit(entry.habit_id)?.is_none() {
            return Err(HabitServiceError::HabitNotFound(entry.habit_id));
        }

        let id = self.entries.create_entry(entry)?;
        self.recompute_after_mutation(entry.habit_id);

        self.entries
            .get_entry(id)?
            .ok_or(HabitServiceError::InconsistentState(
                "created entry not found in read-back",
            ))
    }

    /// Updates an entry and recomputes the owning habit's streak when the
    /// `success` flag or the `date` changed.
    pub fn update_entry(&self, entry: &HabitEntry) -> Result<HabitEntry, HabitServiceError> {
        let stored = self
            .entries
            .get_entry(entry.uuid)?
            .ok_or(HabitServiceError::EntryNotFound(entry.uuid))?;

        self.entries.update_entry(entry)?;

        if stored.success != entry.success || stored.date != entry.date {
            self.recompute_after_mutation(stored.habit_id);
        }

        self.entries
            .get_entry(entry.uuid)?
            .ok_or(HabitServiceError::InconsistentState(
                "updated entry not found in read-back",
            ))
    }

    /// Deletes one entry and recomputes the owning habit's streak.
    pub fn delete_entry(&self, id: EntryId) -> Result<(), HabitServiceError> {
        self.delete_entries(&[id])
    }

    /// Deletes a batch of entries, then recomputes each distinct owning
    /// habit exactly once.
    pub fn delete_entries(&self, ids: &[EntryId]) -> Result<(), HabitServiceError> {
        let mut affected: BTreeSet<HabitId> = BTreeSet::new();
        for id in ids {
            let entry = self
                .entries
                .get_entry(*id)?
                .ok_or(HabitServiceError::EntryNotFound(*id))?;
            affected.insert(entry.habit_id);
        }

        for id in ids {
            self.entries.delete_entry(*id)?;
        }

        for habit_id in affected {
            self.recompute_after_mutation(habit_id);
        }

        Ok(())
    }

    /// Quick check-in for today: creates a successful entry when none
    /// exists for `(habit, today)`, otherwise flips the existing entry's
    /// `success` flag. Routes through the same recompute trigger as the
    /// generic entry paths.
    pub fn check_in_today(
        &self,
        habit_id: HabitId,
        owner: &str,
        today: NaiveDate,
    ) -> Result<HabitEntry, HabitServiceError> {
        match self.entries.find_entry(habit_id, today)? {
            Some(mut existing) => {
                existing.success = !existing.success;
                self.update_entry(&existing)
            }
            None => self.record_entry(&HabitEntry::new(habit_id, owner, today)),
        }
    }

    /// Whether the habit has a successful entry on the given date.
    pub fn is_done_on(&self, habit_id: HabitId, date: NaiveDate) -> Result<bool, HabitServiceError> {
        Ok(self
            .entries
            .find_entry(habit_id, date)?
            .is_some_and(|entry| entry.success))
    }

    /// Lists entries for one habit, oldest first.
    pub fn list_entries(
        &self,
        query: &EntryListQuery,
    ) -> Result<Vec<HabitEntry>, HabitServiceError> {
        Ok(self.entries.list_entries(query)?)
    }

    /// Rebuilds streak state for one habit from its full successful-entry
    /// history and persists the result.
    pub fn recompute_streak(&self, habit_id: HabitId) -> Result<StreakState, HabitServiceError> {
        let habit = self
            .habits
            .get_habit(habit_id)?
            .ok_or(HabitServiceError::HabitNotFound(habit_id))?;
        let dates = self.entries.successful_dates(habit_id)?;
        let state = recompute_streak(&habit.frequency, habit.longest_streak, &dates);
        self.habits.save_streak(habit_id, &state)?;
        Ok(state)
    }

    /// Full recomputation across all habits; the consistency-repair sweep
    /// invoked by the host's scheduled job. Idempotent with the on-write
    /// trigger. Per-habit failures are logged and counted, never fatal.
    pub fn recompute_all_streaks(&self) -> Result<SweepReport, HabitServiceError> {
        let mut report = SweepReport::default();
        for habit_id in self.habits.list_habit_ids()? {
            match self.recompute_streak(habit_id) {
                Ok(_) => report.recomputed += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        "event=streak_sweep module=service status=error habit={habit_id} error={err}"
                    );
                }
            }
        }
        info!(
            "event=streak_sweep module=service status=ok recomputed={} failed={}",
            report.recomputed, report.failed
        );
        Ok(report)
    }

    /// 30-day trailing completion percentage for one habit, in
    /// `[0.0, 100.0]`. `today` is the caller's current local date.
    pub fn completion_rate(
        &self,
        habit_id: HabitId,
        today: NaiveDate,
    ) -> Result<f64, HabitServiceError> {
        let habit = self
            .habits
            .get_habit(habit_id)?
            .ok_or(HabitServiceError::HabitNotFound(habit_id))?;
        let window_start = completion_window_start(today);
        let actual = self
            .entries
            .count_successful(habit_id, window_start, today)?;
        Ok(completion_rate(&habit.frequency, today, actual))
    }

    /// Swallows recomputation failures at the mutation trigger site: the
    /// entry write has already committed and must not be rolled back by a
    /// streak-math defect. The periodic sweep repairs stale state.
    fn recompute_after_mutation(&self, habit_id: HabitId) {
        if let Err(err) = self.recompute_streak(habit_id) {
            warn!(
                "event=streak_recompute module=service status=error habit={habit_id} error={err}"
            );
        }
    }
}

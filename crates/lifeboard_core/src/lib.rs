//! Core domain logic for Lifeboard: habit tracking with streaks, journaling
//! and a vision board over embedded SQLite storage.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod streak;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{EntryId, HabitEntry};
pub use model::habit::{ColorTheme, FrequencyRule, Habit, HabitId};
pub use model::journal::{mood_emoji, JournalEntry, JournalId, Mood};
pub use model::vision::{VisionId, VisionItem};
pub use model::ValidationError;
pub use repo::entry_repo::{EntryListQuery, EntryRepository, SqliteEntryRepository};
pub use repo::habit_repo::{HabitListQuery, HabitRepository, SqliteHabitRepository};
pub use repo::journal_repo::{
    JournalListQuery, JournalRecord, JournalRepository, SqliteJournalRepository,
};
pub use repo::vision_repo::{SqliteVisionRepository, VisionListQuery, VisionRepository};
pub use repo::{RepoError, RepoResult};
pub use service::habit_service::{HabitService, HabitServiceError, SweepReport};
pub use service::journal_service::{
    derive_content_preview, JournalService, JournalServiceError, JournalView,
};
pub use service::vision_service::{VisionService, VisionServiceError};
pub use streak::compute::{
    completion_rate, completion_window_start, recompute_streak, StreakState,
};
pub use streak::frequency::{count_expected, expected_next_date};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

//! Journal entry model.
//!
//! Journal rows are plain attribute containers; the mood emoji and content
//! preview shown on boards are derived at render time by the journal
//! service, never stored.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a journal entry.
pub type JournalId = Uuid;

/// Mood score recorded with a journal entry, 1 (worst) to 5 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Terrible,
    Bad,
    Neutral,
    Good,
    Amazing,
}

impl Mood {
    /// Numeric score used for storage and sorting.
    pub fn score(self) -> u8 {
        match self {
            Self::Terrible => 1,
            Self::Bad => 2,
            Self::Neutral => 3,
            Self::Good => 4,
            Self::Amazing => 5,
        }
    }

    /// Parses a stored score back into a mood.
    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            1 => Some(Self::Terrible),
            2 => Some(Self::Bad),
            3 => Some(Self::Neutral),
            4 => Some(Self::Good),
            5 => Some(Self::Amazing),
            _ => None,
        }
    }

    /// Emoji rendering of this mood.
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Terrible => "😢",
            Self::Bad => "😔",
            Self::Neutral => "😐",
            Self::Good => "🙂",
            Self::Amazing => "😄",
        }
    }
}

/// Emoji for an optional mood; entries without a mood render as a note glyph.
pub fn mood_emoji(mood: Option<Mood>) -> &'static str {
    mood.map_or("📝", Mood::emoji)
}

/// One dated journal entry with optional HTML content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Stable global ID.
    pub uuid: JournalId,
    /// Author reference.
    pub owner: String,
    /// Entry timestamp in epoch milliseconds.
    pub entry_at: i64,
    /// Optional short title.
    pub title: Option<String>,
    /// Optional HTML body. Sanitization is a host concern; core only strips
    /// tags for previews.
    pub content: Option<String>,
    /// Optional recorded mood.
    pub mood: Option<Mood>,
}

impl JournalEntry {
    /// Creates an empty entry with a generated stable ID.
    pub fn new(owner: impl Into<String>, entry_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), owner, entry_at)
    }

    /// Creates an empty entry with a caller-provided stable ID.
    pub fn with_id(uuid: JournalId, owner: impl Into<String>, entry_at: i64) -> Self {
        Self {
            uuid,
            owner: owner.into(),
            entry_at,
            title: None,
            content: None,
            mood: None,
        }
    }
}

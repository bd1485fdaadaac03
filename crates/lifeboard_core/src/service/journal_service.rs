//! Journal use-case service.
//!
//! # Responsibility
//! - Provide journal-specific create/update/get/list APIs.
//! - Derive render-time projections: mood emoji and plain-text content
//!   preview stripped from the HTML body.
//! - Normalize and atomically replace entry tags.
//!
//! # Invariants
//! - Previews are derived on read, never stored.
//! - Tag names are normalized to lowercase and deduplicated.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::journal::{mood_emoji, JournalEntry, JournalId};
use crate::repo::journal_repo::{
    normalize_tag, normalize_tags, JournalListQuery, JournalRecord, JournalRepository,
};
use crate::repo::{RepoError, RepoResult};

const PREVIEW_MAX_CHARS: usize = 100;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum JournalServiceError {
    /// Tag input contains empty values.
    InvalidTag(String),
    /// Target entry does not exist.
    EntryNotFound(JournalId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::EntryNotFound(id) => write!(f, "journal entry not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent journal state: {details}")
            }
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for JournalServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EntryNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Render-ready journal projection with derived display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalView {
    /// The stored entry.
    pub entry: JournalEntry,
    /// Entry tags, normalized to lowercase.
    pub tags: Vec<String>,
    /// Emoji for the recorded mood (note glyph when unset).
    pub mood_emoji: &'static str,
    /// Tag-stripped preview of the HTML content, truncated to 100 chars.
    pub content_preview: Option<String>,
}

impl JournalView {
    fn from_record(record: JournalRecord) -> Self {
        let mood_emoji = mood_emoji(record.entry.mood);
        let content_preview = record
            .entry
            .content
            .as_deref()
            .and_then(derive_content_preview);
        Self {
            entry: record.entry,
            tags: record.tags,
            mood_emoji,
            content_preview,
        }
    }
}

/// Journal service facade over repository implementations.
pub struct JournalService<R: JournalRepository> {
    repo: R,
}

impl<R: JournalRepository> JournalService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one journal entry.
    pub fn create_entry(&self, entry: &JournalEntry) -> Result<JournalView, JournalServiceError> {
        let id = self.repo.create_entry(entry)?;
        let record = self
            .repo
            .get_entry(id)?
            .ok_or(JournalServiceError::InconsistentState(
                "created entry not found in read-back",
            ))?;
        Ok(JournalView::from_record(record))
    }

    /// Replaces entry content fields fully.
    pub fn update_entry(&self, entry: &JournalEntry) -> Result<JournalView, JournalServiceError> {
        self.repo.update_entry(entry)?;
        let record = self
            .repo
            .get_entry(entry.uuid)?
            .ok_or(JournalServiceError::InconsistentState(
                "updated entry not found in read-back",
            ))?;
        Ok(JournalView::from_record(record))
    }

    /// Gets one entry by stable ID with derived display fields.
    pub fn get_entry(&self, id: JournalId) -> Result<Option<JournalView>, JournalServiceError> {
        Ok(self.repo.get_entry(id)?.map(JournalView::from_record))
    }

    /// Lists entries, newest first, using optional owner/tag filters.
    pub fn list_entries(
        &self,
        owner: Option<String>,
        tag: Option<String>,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<Vec<JournalView>, JournalServiceError> {
        let query = JournalListQuery {
            owner,
            tag: tag.and_then(|value| normalize_tag(value.as_str())),
            limit,
            offset,
        };
        let records = self.repo.list_entries(&query)?;
        Ok(records.into_iter().map(JournalView::from_record).collect())
    }

    /// Atomically replaces the full tag set for one entry.
    pub fn set_tags(
        &mut self,
        id: JournalId,
        tags: Vec<String>,
    ) -> Result<JournalView, JournalServiceError> {
        for tag in &tags {
            if tag.trim().is_empty() {
                return Err(JournalServiceError::InvalidTag(tag.clone()));
            }
        }

        let normalized = normalize_tags(&tags);
        self.repo.set_tags(id, &normalized)?;
        let record = self
            .repo
            .get_entry(id)?
            .ok_or(JournalServiceError::InconsistentState(
                "entry missing after tag replacement",
            ))?;
        Ok(JournalView::from_record(record))
    }

    /// Lists normalized tags known by storage.
    pub fn list_tags(&self) -> RepoResult<Vec<String>> {
        self.repo.list_tags()
    }

    /// Deletes one entry; tag links are removed by the storage cascade.
    pub fn delete_entry(&self, id: JournalId) -> Result<(), JournalServiceError> {
        Ok(self.repo.delete_entry(id)?)
    }
}

/// Derives a plain-text preview from HTML journal content.
///
/// Rules:
/// - HTML tags removed, whitespace collapsed.
/// - First 100 chars retained, with a `...` suffix when truncated.
/// - Empty/whitespace-only content yields `None`.
pub fn derive_content_preview(content: &str) -> Option<String> {
    let without_tags = HTML_TAG_RE.replace_all(content, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_tags, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().count() > PREVIEW_MAX_CHARS {
        let mut preview: String = trimmed.chars().take(PREVIEW_MAX_CHARS).collect();
        preview.push_str("...");
        Some(preview)
    } else {
        Some(trimmed.to_string())
    }
}

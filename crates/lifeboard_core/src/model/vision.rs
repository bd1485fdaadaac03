//! Vision board item model.
//!
//! Image and attachment storage belongs to the host; only a path reference
//! is kept on the record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ValidationError;

/// Stable identifier for a vision board item.
pub type VisionId = Uuid;

/// One pinned goal on the owner's vision board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionItem {
    /// Stable global ID.
    pub uuid: VisionId,
    /// Owner reference.
    pub owner: String,
    /// Short goal title. Must not be blank.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Reference to a host-stored image.
    pub image_path: Option<String>,
    /// Free-form grouping label.
    pub category: Option<String>,
    /// Display order within the board.
    pub sequence: i64,
    /// Optional target date for the goal.
    pub target_date: Option<NaiveDate>,
    /// Whether the goal has been reached.
    pub achieved: bool,
}

impl VisionItem {
    /// Creates a new item with a generated stable ID.
    pub fn new(owner: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), owner, title)
    }

    /// Creates a new item with a caller-provided stable ID.
    pub fn with_id(uuid: VisionId, owner: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid,
            owner: owner.into(),
            title: title.into(),
            description: None,
            image_path: None,
            category: None,
            sequence: 10,
            target_date: None,
            achieved: false,
        }
    }

    /// Checks domain invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankVisionTitle);
        }
        Ok(())
    }
}

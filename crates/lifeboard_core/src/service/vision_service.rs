//! Vision board use-case service.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::vision::{VisionId, VisionItem};
use crate::repo::vision_repo::{VisionListQuery, VisionRepository};
use crate::repo::RepoError;

/// Service error for vision board use-cases.
#[derive(Debug)]
pub enum VisionServiceError {
    /// Target item does not exist.
    ItemNotFound(VisionId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for VisionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "vision item not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent vision board state: {details}")
            }
        }
    }
}

impl Error for VisionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for VisionServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ItemNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Vision board service facade over repository implementations.
pub struct VisionService<R: VisionRepository> {
    repo: R,
}

impl<R: VisionRepository> VisionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Pins one item to the board.
    pub fn create_item(&self, item: &VisionItem) -> Result<VisionItem, VisionServiceError> {
        let id = self.repo.create_item(item)?;
        self.repo
            .get_item(id)?
            .ok_or(VisionServiceError::InconsistentState(
                "created item not found in read-back",
            ))
    }

    /// Replaces item fields fully.
    pub fn update_item(&self, item: &VisionItem) -> Result<VisionItem, VisionServiceError> {
        self.repo.update_item(item)?;
        self.repo
            .get_item(item.uuid)?
            .ok_or(VisionServiceError::InconsistentState(
                "updated item not found in read-back",
            ))
    }

    /// Gets one item by stable ID.
    pub fn get_item(&self, id: VisionId) -> Result<Option<VisionItem>, VisionServiceError> {
        Ok(self.repo.get_item(id)?)
    }

    /// Lists board items in display order.
    pub fn list_items(
        &self,
        query: &VisionListQuery,
    ) -> Result<Vec<VisionItem>, VisionServiceError> {
        Ok(self.repo.list_items(query)?)
    }

    /// Marks one goal as achieved (or reopens it).
    pub fn mark_achieved(
        &self,
        id: VisionId,
        achieved: bool,
    ) -> Result<VisionItem, VisionServiceError> {
        self.repo.set_achieved(id, achieved)?;
        self.repo
            .get_item(id)?
            .ok_or(VisionServiceError::InconsistentState(
                "item missing after achieved toggle",
            ))
    }

    /// Removes one item from the board.
    pub fn delete_item(&self, id: VisionId) -> Result<(), VisionServiceError> {
        Ok(self.repo.delete_item(id)?)
    }
}

//! Error types for section selection, history, and batch generation.

use crate::types::{RunId, SectionId};
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Section not found: {0}")]
    SectionNotFound(SectionId),

    #[error("Generation run not found: {0}")]
    RunNotFound(RunId),

    #[error("Section {section_id} update rejected: {reason}")]
    UpdateRejected { section_id: SectionId, reason: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Fatal, run-level errors. A run that returns one of these is never marked done.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider transport failed: {0}")]
    Transport(String),

    #[error("Provider response has an unexpected format: {0}")]
    ResponseFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<config::ConfigError> for GenerationError {
    fn from(err: config::ConfigError) -> Self {
        GenerationError::Configuration(err.to_string())
    }
}

/// Recoverable, per-item merge failures. Collected in the run report; the run
/// still completes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemMergeError {
    #[error("Response item {index} has no usable id")]
    MissingId { index: usize },

    #[error("Section {0} is not part of this run's candidates")]
    UnknownSection(SectionId),

    #[error("Failed to update section {section_id}: {reason}")]
    UpdateFailed { section_id: SectionId, reason: String },
}

impl ItemMergeError {
    /// Section the failure refers to, when the item carried one.
    pub fn section_id(&self) -> Option<SectionId> {
        match self {
            ItemMergeError::MissingId { .. } => None,
            ItemMergeError::UnknownSection(id) => Some(*id),
            ItemMergeError::UpdateFailed { section_id, .. } => Some(*section_id),
        }
    }
}

pub(crate) fn sled_io(err: sled::Error) -> StorageError {
    StorageError::IoError(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))
}

pub(crate) fn invalid_data(err: impl std::fmt::Display) -> StorageError {
    StorageError::IoError(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        err.to_string(),
    ))
}

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Duplicate scan ignored")]
    DuplicateWithinInterval,

    #[error("Saving failed: {0}")]
    Persistence(String),

    #[error("Handoff channel unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    #[error("Confirmation does not match list name '{expected}'")]
    ConfirmationMismatch { expected: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl ScanError {
    pub fn blank(field: &'static str) -> Self {
        ScanError::Validation {
            field,
            reason: "must not be empty".to_string(),
        }
    }

    /// Wraps any storage-level failure so callers see a single "not saved" kind.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        ScanError::Persistence(err.to_string())
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, ScanError::DuplicateWithinInterval)
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

//! Error types for player actions and the local store

use thiserror::Error;

/// Result type for player actions
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Result type for local store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Player action errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// No quest with this id
    #[error("Quest not found: {0}")]
    QuestNotFound(String),

    /// No daily mission with this id
    #[error("Daily mission not found: {0}")]
    DailyNotFound(String),

    /// No reward with this id
    #[error("Reward not found: {0}")]
    RewardNotFound(String),

    /// Mission or reward was already resolved
    #[error("Already resolved: {0}")]
    AlreadyResolved(String),

    /// Not enough XP to pay a cost
    #[error("Insufficient XP: {required} required, have {available}")]
    InsufficientXp { required: u64, available: u64 },

    /// Rejected user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Local store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

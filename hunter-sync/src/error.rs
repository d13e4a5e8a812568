//! Error types for cloud sync

use thiserror::Error;

/// Cloud sync error
#[derive(Debug, Error)]
pub enum SyncError {
    /// No remote URL or key configured
    #[error("Cloud sync is not configured")]
    NotConfigured,

    /// Device marked offline
    #[error("Device is offline")]
    Offline,

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

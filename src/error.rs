//! Error types for the rating pipeline
//!
//! Fallible operations return `anyhow::Result`; the structured cases callers
//! need to tell apart are variants of [`BughouseError`] and can be recovered
//! with `downcast_ref`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific pipeline scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BughouseError {
    #[error("Malformed result in game {game_index}: {value:?}")]
    MalformedResult { game_index: u64, value: String },

    #[error("Invalid game data in game {game_index}: {reason}")]
    InvalidGameData { game_index: u64, reason: String },

    #[error("Fetching game {game_id} failed: {message}")]
    FetchFailed { game_id: u64, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl BughouseError {
    /// Short label used for logging and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            BughouseError::MalformedResult { .. } => "malformed_result",
            BughouseError::InvalidGameData { .. } => "invalid_game_data",
            BughouseError::FetchFailed { .. } => "fetch_failed",
            BughouseError::ConfigurationError { .. } => "configuration",
            BughouseError::InternalError { .. } => "internal",
        }
    }
}

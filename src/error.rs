//! Error types for buildmuc.

use thiserror::Error;

use crate::build::ControlError;
use crate::transport::TransportError;

/// Common error type for buildmuc.
#[derive(Error, Debug)]
pub enum BuildMucError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for configuration or input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Chat transport refused an outbound request.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Build control refused a request.
    #[error("build control error: {0}")]
    Control(#[from] ControlError),

    /// Room is not configured or not known to the bot.
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    /// Malformed JSON on the event feed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BuildMucError {
    /// Short category name, safe to show to chat users.
    pub fn kind(&self) -> &'static str {
        match self {
            BuildMucError::Io(_) => "Io",
            BuildMucError::Config(_) => "Config",
            BuildMucError::Validation(_) => "Validation",
            BuildMucError::Transport(_) => "Transport",
            BuildMucError::Control(_) => "Control",
            BuildMucError::UnknownRoom(_) => "UnknownRoom",
            BuildMucError::Json(_) => "Json",
        }
    }
}

/// Result type alias for buildmuc operations.
pub type Result<T> = std::result::Result<T, BuildMucError>;

//! Error types for ytembed core

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Adapter error types
///
/// Bridge calls (property get/set, method invoke) never fail on an unknown
/// name or an early call: those resolve to a [`crate::BridgeOutcome`]. The
/// variants below are the conditions a caller can actually act upon.
#[derive(Error, Debug)]
pub enum Error {
    // Loader errors
    #[error("Failed to inject embed API script {url}: {reason}")]
    ScriptInjection { url: String, reason: String },

    #[error("Failed to create remote player in container {container_id}: {reason}")]
    PlayerCreation { container_id: String, reason: String },

    // Adapter errors
    #[error("Adapter {0} has been released")]
    AdapterReleased(String),

    #[error("No media files supplied")]
    NoMediaFiles,

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a player creation error
    pub fn creation(container_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::PlayerCreation {
            container_id: container_id.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::PlayerCreation { .. } | Error::InvalidConfig(_))
    }

    /// Returns the error code for logs and diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::ScriptInjection { .. } => "SCRIPT_INJECTION",
            Error::PlayerCreation { .. } => "PLAYER_CREATION",
            Error::AdapterReleased(_) => "ADAPTER_RELEASED",
            Error::NoMediaFiles => "NO_MEDIA_FILES",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ConfigParse(_) => "CONFIG_PARSE",
            Error::Internal(_) => "INTERNAL",
        }
    }
}

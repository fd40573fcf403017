//! Error types for Tara.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all Tara operations.
#[derive(Error, Debug)]
pub enum TaraError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to parse message: {source}")]
    MessageParse {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl TaraError {
    /// Create a parse error that keeps the offending payload for logging.
    pub fn message_parse(payload: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MessageParse {
            payload: payload.into(),
            source,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Connection(_) => ErrorCategory::Connection,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::MessageParse { .. } | Self::Serialization(_) => ErrorCategory::Protocol,
            Self::Audio(_) => ErrorCategory::Audio,
            Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the session cannot go on after this error.
    ///
    /// Parse failures and audio problems are reported and the session
    /// continues; everything else ends it.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.category(),
            ErrorCategory::Protocol | ErrorCategory::Audio
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Connection | ErrorCategory::Network => {
                RecoverySuggestion::CheckNetwork
            }
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Audio => RecoverySuggestion::CheckAudioDevice,
            _ => RecoverySuggestion::None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TaraError>;

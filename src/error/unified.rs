//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Configuration,
    Connection,
    Network,
    Timeout,
    Protocol,
    Audio,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    CheckCredentials,
    CheckConfiguration,
    CheckNetwork,
    IncreaseTimeout,
    CheckAudioDevice,
    None,
}

impl RecoverySuggestion {
    /// Human-readable hint, if there is anything useful to say.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CheckCredentials | Self::CheckConfiguration => Some(
                "Please check your environment variables:\n- ELEVENLABS_API_KEY\n- ELEVENLABS_AGENT_ID",
            ),
            Self::CheckNetwork => Some("Check your network connection and ELEVENLABS_BASE_URL"),
            Self::IncreaseTimeout => Some("The service did not answer in time; try again later"),
            Self::CheckAudioDevice => Some("Check that a microphone is connected and accessible"),
            Self::None => None,
        }
    }
}

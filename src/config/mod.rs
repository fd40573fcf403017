//! Client configuration (layered: CLI flags > env > `.env` file).

use std::fmt;
use std::time::Duration;

use crate::audio::AudioSpec;
use crate::error::TaraError;
use crate::realtime::SessionConfiguration;

pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";
pub const AGENT_ID_ENV: &str = "ELEVENLABS_AGENT_ID";
pub const BASE_URL_ENV: &str = "ELEVENLABS_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_GREETING: &str = "Hello TARA! I'm a student and I'd like to talk about managing academic stress and mental wellness.";

/// Everything a session needs, resolved once at startup.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub agent_id: String,
    pub base_url: String,
    pub request_timeout: Duration,
    /// Sent as the first user turn after `session.created`; `None` disables it.
    pub greeting: Option<String>,
    pub session: SessionConfiguration,
    pub audio: AudioSpec,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("agent_id", &self.agent_id)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("greeting", &self.greeting)
            .field("session", &self.session)
            .field("audio", &self.audio)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config with explicit credentials and defaults for everything else.
    pub fn new(api_key: impl Into<String>, agent_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent_id: agent_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            greeting: Some(DEFAULT_GREETING.to_string()),
            session: SessionConfiguration::default(),
            audio: AudioSpec::default(),
        }
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, TaraError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TaraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| TaraError::Configuration(format!("{key} is not set")))
        };

        let mut config = Self::new(required(API_KEY_ENV)?, required(AGENT_ID_ENV)?);
        if let Some(url) = lookup(BASE_URL_ENV).filter(|value| !value.trim().is_empty()) {
            config = config.with_base_url(url)?;
        }
        Ok(config)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    /// Override the REST base URL. Only `http` and `https` are accepted.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, TaraError> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(TaraError::Configuration(format!(
                "Base URL must start with http:// or https://, got '{base_url}'"
            )));
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_greeting(mut self, greeting: Option<String>) -> Self {
        self.greeting = greeting.filter(|text| !text.trim().is_empty());
        self
    }

    pub fn with_session(mut self, session: SessionConfiguration) -> Self {
        self.session = session;
        self
    }

    pub fn with_audio(mut self, audio: AudioSpec) -> Self {
        self.audio = audio;
        self
    }

    /// Reject configs that cannot possibly authenticate.
    pub fn validate(&self) -> Result<(), TaraError> {
        if self.api_key.trim().is_empty() {
            return Err(TaraError::Configuration(format!("{API_KEY_ENV} is empty")));
        }
        if self.agent_id.trim().is_empty() {
            return Err(TaraError::Configuration(format!("{AGENT_ID_ENV} is empty")));
        }
        Ok(())
    }
}

//! CLI entry point for Tara.

pub mod console;
pub mod render;
pub mod repl;

pub use console::ConsoleCommand;
pub use render::render_event;
pub use repl::run;

use std::time::Duration;

use clap::Parser;

use crate::config::{ClientConfig, AGENT_ID_ENV, API_KEY_ENV, BASE_URL_ENV};
use crate::error::TaraError;

/// Tara conversational agent CLI
#[derive(Parser, Debug)]
#[command(
    name = "tara",
    version,
    about = "Chat with an ElevenLabs conversational agent by text or voice"
)]
pub struct Cli {
    /// API key (defaults to ELEVENLABS_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Agent id (defaults to ELEVENLABS_AGENT_ID)
    #[arg(long)]
    pub agent_id: Option<String>,

    /// REST base URL (defaults to ELEVENLABS_BASE_URL or https://api.elevenlabs.io)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Opening message sent once the session is created
    #[arg(long, conflicts_with = "no_greeting")]
    pub greeting: Option<String>,

    /// Do not send an opening message
    #[arg(long)]
    pub no_greeting: bool,

    /// Timeout for the signed URL request, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log filter (e.g. `debug`, `tara=trace`); overrides RUST_LOG
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Merge flags over the environment (and `.env`).
    pub fn resolve_config(&self) -> Result<ClientConfig, TaraError> {
        let _ = dotenvy::dotenv();
        self.resolve_config_with(|key| std::env::var(key).ok())
    }

    pub fn resolve_config_with<F>(&self, env: F) -> Result<ClientConfig, TaraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ClientConfig::from_lookup(|key| {
            let flag = match key {
                API_KEY_ENV => self.api_key.clone(),
                AGENT_ID_ENV => self.agent_id.clone(),
                BASE_URL_ENV => self.base_url.clone(),
                _ => None,
            };
            flag.or_else(|| env(key))
        })?
        .with_request_timeout(Duration::from_secs(self.timeout_secs));

        Ok(if self.no_greeting {
            config.with_greeting(None)
        } else if let Some(greeting) = &self.greeting {
            config.with_greeting(Some(greeting.clone()))
        } else {
            config
        })
    }
}

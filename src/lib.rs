//! Tara: realtime client for ElevenLabs conversational agents
//!
//! Exchanges an API key for a signed conversation URL, opens one WebSocket
//! stream, configures the session, and lets the caller exchange text and
//! recorded speech with the agent while events stream back.
//!
//! # Quick Start
//!
//! ```no_run
//! use tara::prelude::*;
//!
//! # async fn example() -> tara::error::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let mut session = RealtimeSession::new(config);
//! session.connect().await?;
//! session.send_text("Exams are next week and I can't sleep.");
//! while let Some(event) = session.next_event().await {
//!     if let RealtimeEvent::Closed { .. } = event {
//!         break;
//!     }
//!     println!("{event:?}");
//! }
//! session.disconnect().await?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod prelude;
pub mod realtime;

#[cfg(feature = "cli")]
pub mod cli;

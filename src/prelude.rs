//! Convenience re-exports for common use.

pub use crate::audio::{AudioInput, AudioSpec, CaptureStream};
pub use crate::config::ClientConfig;
pub use crate::error::{Result, TaraError};
pub use crate::realtime::{
    ClientEvent, RealtimeEvent, RealtimeSession, ServerEvent, SessionConfiguration,
};

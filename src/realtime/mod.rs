//! Realtime conversation session (WebSocket-based).

pub mod config;
pub mod dispatch;
pub mod events;
pub mod outbound;
pub mod session;

pub use config::{
    AudioFormat, Modality, ResponseOptions, SessionConfiguration, TranscriptionSettings,
    TurnDetection,
};
pub use dispatch::{Dispatch, Dispatcher};
pub use events::{ClientEvent, ContentPart, ConversationItem, RealtimeEvent, Role, ServerEvent};
pub use outbound::OutboundQueue;
pub use session::{parse_server_payload, RealtimeSession};

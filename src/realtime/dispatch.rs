//! Per-connection handling of inbound events.

use tracing::{debug, info, warn};

use super::events::{ClientEvent, ServerEvent};

/// What the listen loop should do with one inbound event.
#[derive(Debug, Default, PartialEq)]
pub struct Dispatch {
    /// Events to write back immediately, in order.
    pub replies: Vec<ClientEvent>,
    /// Whether the caller should see the event.
    pub forward: bool,
}

/// Handles inbound events for a single connection.
///
/// The only state carried between events is whether the greeting went out.
#[derive(Debug)]
pub struct Dispatcher {
    greeting: Option<String>,
    greeted: bool,
}

impl Dispatcher {
    pub fn new(greeting: Option<String>) -> Self {
        Self {
            greeting,
            greeted: false,
        }
    }

    pub fn dispatch(&mut self, event: &ServerEvent) -> Dispatch {
        debug!(event_type = event.event_type(), "received");
        match event {
            ServerEvent::SessionCreated { session_id } => {
                info!(session_id = session_id.as_deref().unwrap_or("unknown"), "session created");
                Dispatch {
                    replies: self.take_greeting(),
                    forward: true,
                }
            }
            ServerEvent::Error { message } => {
                warn!(message = %message, "server reported an error");
                Dispatch::forward()
            }
            ServerEvent::Unknown { event_type } => {
                debug!(event_type = %event_type, "unhandled message type");
                Dispatch::default()
            }
            _ => Dispatch::forward(),
        }
    }

    fn take_greeting(&mut self) -> Vec<ClientEvent> {
        if self.greeted {
            return Vec::new();
        }
        self.greeted = true;
        match &self.greeting {
            Some(text) => {
                info!("sending initial greeting");
                vec![ClientEvent::user_text(text.clone()), ClientEvent::response_create()]
            }
            None => Vec::new(),
        }
    }
}

impl Dispatch {
    fn forward() -> Self {
        Self {
            replies: Vec::new(),
            forward: true,
        }
    }
}

//! Outbound event queue shared by everything that writes to the stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::events::ClientEvent;

/// Cloneable handle for queueing events onto the open stream.
///
/// The runtime task drains the queue and writes one complete frame per
/// event, so concurrent senders never interleave partial messages.
#[derive(Clone)]
pub struct OutboundQueue {
    tx: mpsc::UnboundedSender<ClientEvent>,
    connected: Arc<AtomicBool>,
}

impl OutboundQueue {
    pub(crate) fn new(
        tx: mpsc::UnboundedSender<ClientEvent>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self { tx, connected }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.tx.is_closed()
    }

    /// Queue one event. Returns `false` (and logs) when not connected.
    pub fn send(&self, event: ClientEvent) -> bool {
        if !self.is_connected() {
            warn!(event_type = event.event_type(), "not connected, dropping outbound event");
            return false;
        }
        debug!(event_type = event.event_type(), "queueing outbound event");
        self.tx.send(event).is_ok()
    }

    /// Queue several events back to back, stopping at the first failure.
    pub fn send_all(&self, events: impl IntoIterator<Item = ClientEvent>) -> bool {
        events.into_iter().all(|event| self.send(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_is_noop_when_disconnected() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let queue = OutboundQueue::new(tx, Arc::new(AtomicBool::new(false)));

        assert!(!queue.send(ClientEvent::response_create()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_all_preserves_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let queue = OutboundQueue::new(tx, Arc::new(AtomicBool::new(true)));

        assert!(queue.send_all([
            ClientEvent::user_text("hi"),
            ClientEvent::response_create(),
        ]));
        assert_eq!(rx.try_recv().unwrap().event_type(), "conversation.item.create");
        assert_eq!(rx.try_recv().unwrap().event_type(), "response.create");
    }

    #[test]
    fn closed_receiver_counts_as_disconnected() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let queue = OutboundQueue::new(tx, Arc::new(AtomicBool::new(true)));
        assert!(!queue.is_connected());
        assert!(!queue.send(ClientEvent::InputAudioBufferCommit));
    }
}

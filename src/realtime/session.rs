//! Realtime conversation session over WebSocket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{
    net::TcpStream,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use super::dispatch::Dispatcher;
use super::events::{ClientEvent, RealtimeEvent, ServerEvent};
use super::outbound::OutboundQueue;
use crate::audio::{default_input, AudioInput, Recorder, RecordingSummary};
use crate::auth::SignedUrlClient;
use crate::config::ClientConfig;
use crate::error::TaraError;

type RealtimeWebSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct RealtimeRuntime {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// One conversation with a remote agent.
///
/// At most one stream is open per session. Events arrive through
/// [`RealtimeSession::next_event`]; text and recorded audio can be sent at
/// any time while connected.
pub struct RealtimeSession {
    config: ClientConfig,
    audio_input: Arc<dyn AudioInput>,
    connected: Arc<AtomicBool>,
    outbound: Option<OutboundQueue>,
    events_rx: Option<mpsc::UnboundedReceiver<RealtimeEvent>>,
    runtime: Option<RealtimeRuntime>,
    recorder: Option<Recorder>,
    session_id: Option<String>,
}

impl RealtimeSession {
    /// Create a new session (does not connect yet).
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            audio_input: default_input(),
            connected: Arc::new(AtomicBool::new(false)),
            outbound: None,
            events_rx: None,
            runtime: None,
            recorder: None,
            session_id: None,
        }
    }

    /// Record from a different input than the platform default.
    pub fn with_audio_input(mut self, input: Arc<dyn AudioInput>) -> Self {
        self.audio_input = input;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn is_recording(&self) -> bool {
        self.recorder
            .as_ref()
            .is_some_and(|recorder| !recorder.is_finished())
    }

    /// Id the server assigned in `session.created`, once seen.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Fetch a signed URL, open the stream and send the session configuration.
    pub async fn connect(&mut self) -> Result<(), TaraError> {
        if self.is_connected() {
            return Err(TaraError::InvalidState(
                "Realtime session is already connected".into(),
            ));
        }
        // A previous stream closed remotely; reap its task before reusing the slot.
        self.shutdown_runtime().await?;
        self.config.validate()?;

        let result = self.open_stream().await;
        if result.is_err() {
            self.connected.store(false, Ordering::SeqCst);
        }
        result
    }

    async fn open_stream(&mut self) -> Result<(), TaraError> {
        let signed_url = SignedUrlClient::from_config(&self.config)
            .get_signed_url()
            .await?;
        info!("connecting to agent");
        let mut socket = connect_signed_url(&signed_url).await?;

        info!("configuring session");
        let bootstrap = ClientEvent::session_update(self.config.session.clone());
        write_event(&mut socket, &bootstrap).await?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        self.connected.store(true, Ordering::SeqCst);
        let task = tokio::spawn(run_listen_loop(
            socket,
            outbound_rx,
            events_tx,
            shutdown_rx,
            Dispatcher::new(self.config.greeting.clone()),
            Arc::clone(&self.connected),
        ));

        self.outbound = Some(OutboundQueue::new(outbound_tx, Arc::clone(&self.connected)));
        self.events_rx = Some(events_rx);
        self.runtime = Some(RealtimeRuntime { shutdown_tx, task });
        self.session_id = None;
        info!("connected");
        Ok(())
    }

    /// Wait for the next event from the stream.
    ///
    /// Yields [`RealtimeEvent::Closed`] once when the stream ends, then `None`.
    pub async fn next_event(&mut self) -> Option<RealtimeEvent> {
        let event = self.events_rx.as_mut()?.recv().await?;
        if let RealtimeEvent::Server(ServerEvent::SessionCreated { session_id }) = &event {
            self.session_id = session_id.clone();
        }
        Some(event)
    }

    /// Hand every event to `on_event` until the stream closes.
    pub async fn listen<F>(&mut self, mut on_event: F)
    where
        F: FnMut(&RealtimeEvent),
    {
        while let Some(event) = self.next_event().await {
            on_event(&event);
            if matches!(event, RealtimeEvent::Closed { .. }) {
                break;
            }
        }
    }

    /// Send a user text turn followed by `response.create`.
    ///
    /// Returns `false` without sending when not connected.
    pub fn send_text(&self, text: &str) -> bool {
        match &self.outbound {
            Some(outbound) => {
                info!(chars = text.chars().count(), "sending text message");
                outbound.send_all([ClientEvent::user_text(text), ClientEvent::response_create()])
            }
            None => {
                warn!("not connected, text message not sent");
                false
            }
        }
    }

    /// Start capturing audio. A no-op if already recording.
    pub async fn start_recording(&mut self) -> Result<(), TaraError> {
        if self.is_recording() {
            debug!("already recording");
            return Ok(());
        }
        // Reap a recorder whose input ended on its own.
        self.stop_recording().await?;

        let outbound = match &self.outbound {
            Some(outbound) if outbound.is_connected() => outbound.clone(),
            _ => {
                return Err(TaraError::InvalidState(
                    "Cannot record while not connected".into(),
                ))
            }
        };
        let recorder =
            Recorder::start(Arc::clone(&self.audio_input), self.config.audio, outbound).await?;
        self.recorder = Some(recorder);
        Ok(())
    }

    /// Stop capturing and send what was recorded. `None` if nothing was recording.
    pub async fn stop_recording(&mut self) -> Result<Option<RecordingSummary>, TaraError> {
        match self.recorder.take() {
            Some(recorder) => recorder.stop().await.map(Some),
            None => Ok(None),
        }
    }

    /// Stop recording and close the stream. Safe to call repeatedly.
    pub async fn disconnect(&mut self) -> Result<(), TaraError> {
        let recording = self.stop_recording().await;
        let closed = self.shutdown_runtime().await;
        if self.outbound.take().is_some() {
            info!("disconnected");
        }
        self.connected.store(false, Ordering::SeqCst);
        recording?;
        closed
    }

    async fn shutdown_runtime(&mut self) -> Result<(), TaraError> {
        if let Some(runtime) = self.runtime.take() {
            let _ = runtime.shutdown_tx.send(true);
            runtime.task.await.map_err(|error| {
                TaraError::Connection(format!("Realtime runtime task failed: {error}"))
            })?;
        }
        Ok(())
    }
}

impl Drop for RealtimeSession {
    fn drop(&mut self) {
        // Cancels the capture worker; it releases the device without being joined.
        drop(self.recorder.take());
        if let Some(runtime) = self.runtime.take() {
            let _ = runtime.shutdown_tx.send(true);
            runtime.task.abort();
        }
    }
}

/// How an inbound frame affects the loop.
enum Inbound {
    Event(ServerEvent),
    Ignored,
    Closed(Option<String>),
}

async fn run_listen_loop(
    mut socket: RealtimeWebSocket,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientEvent>,
    events_tx: mpsc::UnboundedSender<RealtimeEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
    mut dispatcher: Dispatcher,
    connected: Arc<AtomicBool>,
) {
    let reason = loop {
        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    while let Ok(event) = outbound_rx.try_recv() {
                        if write_event(&mut socket, &event).await.is_err() {
                            break;
                        }
                    }
                    let _ = socket.close(None).await;
                    break None;
                }
            }
            Some(event) = outbound_rx.recv() => {
                if let Err(error) = write_event(&mut socket, &event).await {
                    error!(error = %error, "failed to send event");
                    break Some(error.to_string());
                }
            }
            frame = socket.next() => {
                let inbound = match frame {
                    Some(Ok(message)) => handle_server_message(&mut socket, message).await,
                    Some(Err(error)) => Err(error),
                    None => Ok(Inbound::Closed(None)),
                };
                match inbound {
                    Ok(Inbound::Event(event)) => {
                        let dispatch = dispatcher.dispatch(&event);
                        let mut failed = None;
                        for reply in &dispatch.replies {
                            if let Err(error) = write_event(&mut socket, reply).await {
                                failed = Some(error.to_string());
                                break;
                            }
                        }
                        if dispatch.forward {
                            let _ = events_tx.send(RealtimeEvent::Server(event));
                        }
                        if let Some(reason) = failed {
                            error!(reason = %reason, "failed to send reply");
                            break Some(reason);
                        }
                    }
                    Ok(Inbound::Ignored) => {}
                    Ok(Inbound::Closed(reason)) => {
                        info!(reason = reason.as_deref().unwrap_or(""), "connection closed");
                        break reason;
                    }
                    Err(error) => {
                        error!(error = %error, "error listening for messages");
                        break Some(error.to_string());
                    }
                }
            }
        }
    };

    connected.store(false, Ordering::SeqCst);
    let _ = events_tx.send(RealtimeEvent::Closed { reason });
}

async fn handle_server_message(
    socket: &mut RealtimeWebSocket,
    message: Message,
) -> Result<Inbound, WsError> {
    let inbound = match message {
        Message::Text(text) => parse_or_log(&text),
        Message::Binary(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => parse_or_log(&text),
            Err(_) => {
                debug!("ignoring non-UTF-8 binary frame");
                Inbound::Ignored
            }
        },
        Message::Ping(payload) => {
            socket.send(Message::Pong(payload)).await?;
            Inbound::Ignored
        }
        Message::Pong(_) | Message::Frame(_) => Inbound::Ignored,
        Message::Close(frame) => {
            Inbound::Closed(frame.map(|frame| frame.reason.to_string()).filter(|r| !r.is_empty()))
        }
    };
    Ok(inbound)
}

fn parse_or_log(payload: &str) -> Inbound {
    match parse_server_payload(payload) {
        Ok(event) => Inbound::Event(event),
        Err(error) => {
            warn!(error = %error, payload = %payload, "dropping malformed message");
            Inbound::Ignored
        }
    }
}

/// Parse one text frame into a typed server event.
pub fn parse_server_payload(payload: &str) -> Result<ServerEvent, TaraError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|error| TaraError::message_parse(payload, error))?;
    Ok(ServerEvent::from_server_payload(&value))
}

async fn write_event(socket: &mut RealtimeWebSocket, event: &ClientEvent) -> Result<(), TaraError> {
    let payload = serde_json::to_string(event)?;
    debug!(event_type = event.event_type(), "sending");
    socket
        .send(Message::Text(payload.into()))
        .await
        .map_err(|error| TaraError::Connection(format!("Failed to send {}: {error}", event.event_type())))
}

async fn connect_signed_url(url: &str) -> Result<RealtimeWebSocket, TaraError> {
    connect_async(url)
        .await
        .map(|(socket, _)| socket)
        .map_err(map_connect_error)
}

fn map_connect_error(error: WsError) -> TaraError {
    match error {
        WsError::Http(response) => {
            let status = response.status().as_u16();
            if matches!(status, 401 | 403) {
                TaraError::Authentication(format!(
                    "WebSocket handshake rejected with status {status}"
                ))
            } else {
                TaraError::Connection(format!("WebSocket handshake failed with status {status}"))
            }
        }
        WsError::Url(error) => TaraError::Connection(format!("Invalid signed URL: {error}")),
        other => TaraError::Connection(format!("WebSocket connect failed: {other}")),
    }
}

//! Local stand-in for the agent service: a wiremock signed-URL endpoint
//! pointing at a WebSocket listener on loopback.

#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tara::auth::SIGNED_URL_PATH;
use tara::config::ClientConfig;
use tara::realtime::{ClientEvent, RealtimeEvent, RealtimeSession};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{
    accept_async, accept_hdr_async,
    tungstenite::{
        handshake::server::{Request, Response},
        http::StatusCode,
        Message,
    },
    WebSocketStream,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const AGENT_ID: &str = "agent-test";

pub type AgentSocket = WebSocketStream<TcpStream>;

pub struct StubAgent {
    pub rest: MockServer,
    listener: TcpListener,
}

impl StubAgent {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener
            .local_addr()
            .expect("local addr should be available");

        let rest = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SIGNED_URL_PATH))
            .and(query_param("agent_id", AGENT_ID))
            .and(header("xi-api-key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "signed_url": format!("ws://{address}/v1/convai/conversation?conversation_signature=sig")
            })))
            .mount(&rest)
            .await;

        Self { rest, listener }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(API_KEY, AGENT_ID)
            .with_base_url(self.rest.uri())
            .expect("mock server uri should be a valid base url")
    }

    pub async fn accept(&self) -> AgentSocket {
        let (stream, _) = self.listener.accept().await.expect("server should accept");
        accept_async(stream).await.expect("handshake should succeed")
    }

    /// Answer the next handshake with `status` instead of upgrading.
    pub async fn reject(&self, status: StatusCode) {
        let (stream, _) = self.listener.accept().await.expect("server should accept");
        let result = accept_hdr_async(stream, move |_req: &Request, _response: Response| {
            let response = tokio_tungstenite::tungstenite::http::Response::builder()
                .status(status)
                .body(Some("rejected".to_string()))
                .expect("rejection response should build");
            Err(response)
        })
        .await;
        assert!(result.is_err());
    }
}

/// Connect `session` against `agent`, returning the server side of the stream.
pub async fn connect(session: &mut RealtimeSession, agent: &StubAgent) -> AgentSocket {
    let (connected, socket) = tokio::join!(session.connect(), agent.accept());
    connected.expect("connect should succeed");
    socket
}

pub async fn send_json(socket: &mut AgentSocket, value: Value) {
    send_raw(socket, &value.to_string()).await;
}

pub async fn send_raw(socket: &mut AgentSocket, text: &str) {
    socket
        .send(Message::Text(text.to_string().into()))
        .await
        .expect("server frame should send");
}

/// Next text frame the client wrote, skipping control frames.
pub async fn recv_text(socket: &mut AgentSocket) -> String {
    loop {
        let frame = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("client frame wait should not timeout")
            .expect("client stream should stay open")
            .expect("client frame should be readable");
        match frame {
            Message::Text(text) => return text.to_string(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected client frame: {other:?}"),
        }
    }
}

pub async fn recv_event(socket: &mut AgentSocket) -> ClientEvent {
    let text = recv_text(socket).await;
    serde_json::from_str(&text)
        .unwrap_or_else(|error| panic!("client frame should be a known event: {error}: {text}"))
}

pub async fn next_event(session: &mut RealtimeSession) -> RealtimeEvent {
    timeout(Duration::from_secs(2), session.next_event())
        .await
        .expect("event wait should not timeout")
        .expect("event channel should stay open")
}

pub fn session_created(id: &str) -> Value {
    json!({"type": "session.created", "session": {"id": id}})
}

//! Realtime wire events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{ResponseOptions, SessionConfiguration};

/// Speaker of a conversation item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    #[serde(other)]
    Other,
}

/// One content part of a conversation item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl ContentPart {
    pub fn input_text(text: impl Into<String>) -> Self {
        Self {
            kind: "input_text".into(),
            text: Some(text.into()),
            transcript: None,
        }
    }
}

/// A conversation item as sent in `conversation.item.create` or reported
/// by `conversation.item.created` / `response.output_item.added`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

impl ConversationItem {
    /// A user message carrying one `input_text` part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: "message".into(),
            role: Some(Role::User),
            content: vec![ContentPart::input_text(text)],
        }
    }

    pub fn is_message(&self) -> bool {
        self.kind == "message"
    }

    /// Texts of the `text` content parts, in order.
    pub fn text_parts(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.as_deref())
    }
}

/// Events the client sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfiguration },
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: ConversationItem },
    #[serde(rename = "response.create")]
    ResponseCreate { response: ResponseOptions },
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend { audio: String },
    #[serde(rename = "input_audio_buffer.commit")]
    InputAudioBufferCommit,
}

impl ClientEvent {
    pub fn session_update(session: SessionConfiguration) -> Self {
        Self::SessionUpdate { session }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::ConversationItemCreate {
            item: ConversationItem::user_text(text),
        }
    }

    pub fn response_create() -> Self {
        Self::ResponseCreate {
            response: ResponseOptions::default(),
        }
    }

    /// Append base64-encoded PCM to the remote input buffer.
    pub fn audio_append(audio: impl Into<String>) -> Self {
        Self::InputAudioBufferAppend {
            audio: audio.into(),
        }
    }

    /// The `type` tag this event is sent with.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::ConversationItemCreate { .. } => "conversation.item.create",
            Self::ResponseCreate { .. } => "response.create",
            Self::InputAudioBufferAppend { .. } => "input_audio_buffer.append",
            Self::InputAudioBufferCommit => "input_audio_buffer.commit",
        }
    }
}

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    SessionCreated { session_id: Option<String> },
    SessionUpdated,
    ConversationItemCreated { item: ConversationItem },
    InputTranscriptionCompleted { transcript: String },
    AudioDelta { delta: String },
    AudioDone { has_audio: bool },
    OutputItemAdded { item: ConversationItem },
    AudioTranscriptDone { transcript: String },
    ResponseDone,
    SpeechStarted,
    SpeechStopped,
    Error { message: String },
    Unknown { event_type: String },
}

impl ServerEvent {
    /// Parse a server event payload into a typed event.
    ///
    /// Never fails: payloads without a `type` field, or with a type this
    /// client does not know, become [`ServerEvent::Unknown`].
    pub fn from_server_payload(payload: &Value) -> Self {
        let event_type = payload
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        match event_type {
            "session.created" => Self::SessionCreated {
                session_id: string_at(payload, &["session", "id"])
                    .or_else(|| string_field(payload, "session_id")),
            },
            "session.updated" => Self::SessionUpdated,
            "conversation.item.created" => Self::ConversationItemCreated {
                item: item_field(payload),
            },
            "conversation.item.input_audio_transcription.completed" => {
                Self::InputTranscriptionCompleted {
                    transcript: string_field(payload, "transcript").unwrap_or_default(),
                }
            }
            "response.audio.delta" => Self::AudioDelta {
                delta: string_field(payload, "delta").unwrap_or_default(),
            },
            "response.audio.done" => Self::AudioDone {
                has_audio: payload
                    .get("response")
                    .and_then(|response| response.get("audio"))
                    .is_some(),
            },
            "response.output_item.added" => Self::OutputItemAdded {
                item: item_field(payload),
            },
            "response.audio_transcript.done" => Self::AudioTranscriptDone {
                transcript: string_field(payload, "transcript").unwrap_or_default(),
            },
            "response.done" => Self::ResponseDone,
            "input_audio_buffer.speech_started" => Self::SpeechStarted,
            "input_audio_buffer.speech_stopped" => Self::SpeechStopped,
            "error" => Self::Error {
                message: string_at(payload, &["error", "message"])
                    .or_else(|| string_field(payload, "message"))
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
            other => Self::Unknown {
                event_type: other.to_string(),
            },
        }
    }

    /// The wire `type` tag, for logging.
    pub fn event_type(&self) -> &str {
        match self {
            Self::SessionCreated { .. } => "session.created",
            Self::SessionUpdated => "session.updated",
            Self::ConversationItemCreated { .. } => "conversation.item.created",
            Self::InputTranscriptionCompleted { .. } => {
                "conversation.item.input_audio_transcription.completed"
            }
            Self::AudioDelta { .. } => "response.audio.delta",
            Self::AudioDone { .. } => "response.audio.done",
            Self::OutputItemAdded { .. } => "response.output_item.added",
            Self::AudioTranscriptDone { .. } => "response.audio_transcript.done",
            Self::ResponseDone => "response.done",
            Self::SpeechStarted => "input_audio_buffer.speech_started",
            Self::SpeechStopped => "input_audio_buffer.speech_stopped",
            Self::Error { .. } => "error",
            Self::Unknown { event_type } => event_type,
        }
    }
}

/// What a session hands to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeEvent {
    Server(ServerEvent),
    /// The stream ended; no further events follow.
    Closed { reason: Option<String> },
}

fn item_field(payload: &Value) -> ConversationItem {
    payload
        .get("item")
        .cloned()
        .and_then(|item| serde_json::from_value(item).ok())
        .unwrap_or_default()
}

fn string_field(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str().map(ToString::to_string)
}

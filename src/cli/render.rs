//! Console rendering of session events.

use crate::realtime::{RealtimeEvent, Role, ServerEvent};

/// Lines to print for one event. Empty when the event is not shown.
pub fn render_event(event: &RealtimeEvent) -> Vec<String> {
    match event {
        RealtimeEvent::Server(server) => render_server_event(server),
        RealtimeEvent::Closed { reason: Some(reason) } => {
            vec![format!("🔌 Connection closed: {reason}")]
        }
        RealtimeEvent::Closed { reason: None } => vec!["🔌 Connection closed".to_string()],
    }
}

fn render_server_event(event: &ServerEvent) -> Vec<String> {
    match event {
        ServerEvent::SessionCreated { .. } => vec!["✅ Session created successfully".into()],
        ServerEvent::SessionUpdated => vec!["✅ Session updated".into()],
        ServerEvent::ConversationItemCreated { item } if item.role == Some(Role::Assistant) => {
            agent_lines(item.text_parts())
        }
        ServerEvent::OutputItemAdded { item } if item.is_message() => {
            agent_lines(item.text_parts())
        }
        ServerEvent::InputTranscriptionCompleted { transcript } if !transcript.is_empty() => {
            vec![format!("🎤 You said: {transcript}")]
        }
        ServerEvent::AudioDone { has_audio: true } => {
            vec!["🔊 Received audio response from TARA".into()]
        }
        ServerEvent::AudioTranscriptDone { transcript } if !transcript.is_empty() => {
            vec![format!("🌸 TARA (transcript): {transcript}")]
        }
        ServerEvent::ResponseDone => vec!["✅ Response completed".into()],
        ServerEvent::SpeechStarted => vec!["🎤 Speech detected...".into()],
        ServerEvent::SpeechStopped => vec!["🎤 Speech ended".into()],
        ServerEvent::Error { message } => vec![format!("❌ Error from TARA: {message}")],
        _ => Vec::new(),
    }
}

fn agent_lines<'a>(texts: impl Iterator<Item = &'a str>) -> Vec<String> {
    texts.map(|text| format!("🌸 TARA: {text}")).collect()
}

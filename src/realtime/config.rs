//! Realtime session configuration.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub const DEFAULT_INSTRUCTIONS: &str = "You are TARA, a compassionate AI mental health companion specifically designed to support students. \
You understand academic stress, social pressures, exam anxiety, and the unique challenges students face. \
Provide empathetic, supportive responses while maintaining appropriate boundaries. \
Always encourage students to seek professional help when needed.";
pub const DEFAULT_VOICE: &str = "alloy";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

pub const DEFAULT_VAD_THRESHOLD: f64 = 0.5;
pub const DEFAULT_PREFIX_PADDING_MS: u32 = 300;
pub const DEFAULT_SILENCE_DURATION_MS: u32 = 200;

/// A content channel a turn may use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
}

/// Both modalities, the default for sessions and responses.
pub fn all_modalities() -> Vec<Modality> {
    vec![Modality::Text, Modality::Audio]
}

/// Wire audio encoding.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AudioFormat {
    #[default]
    Pcm16,
    G711Ulaw,
    G711Alaw,
}

/// Input transcription settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptionSettings {
    pub model: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
        }
    }
}

/// Remote turn detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnDetection {
    /// Voice-activity detection on the server.
    ServerVad {
        threshold: f64,
        prefix_padding_ms: u32,
        silence_duration_ms: u32,
    },
}

impl Default for TurnDetection {
    fn default() -> Self {
        Self::ServerVad {
            threshold: DEFAULT_VAD_THRESHOLD,
            prefix_padding_ms: DEFAULT_PREFIX_PADDING_MS,
            silence_duration_ms: DEFAULT_SILENCE_DURATION_MS,
        }
    }
}

/// The `session` payload of a `session.update` event.
///
/// ```
/// use tara::realtime::{Modality, SessionConfiguration};
///
/// let session = SessionConfiguration::builder()
///     .modalities(vec![Modality::Text])
///     .instructions("Be brief.")
///     .build();
/// assert_eq!(session.voice, "alloy");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct SessionConfiguration {
    #[builder(default = all_modalities())]
    pub modalities: Vec<Modality>,
    #[builder(into, default = DEFAULT_INSTRUCTIONS.to_string())]
    pub instructions: String,
    #[builder(into, default = DEFAULT_VOICE.to_string())]
    pub voice: String,
    #[builder(default)]
    pub input_audio_format: AudioFormat,
    #[builder(default)]
    pub output_audio_format: AudioFormat,
    #[builder(default)]
    pub input_audio_transcription: TranscriptionSettings,
    #[builder(default)]
    pub turn_detection: TurnDetection,
}

impl Default for SessionConfiguration {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The `response` payload of a `response.create` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseOptions {
    pub modalities: Vec<Modality>,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            modalities: all_modalities(),
        }
    }
}

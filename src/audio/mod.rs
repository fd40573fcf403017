//! Audio capture: device abstraction, format conversion, background recorder,
//! microphone.

pub mod capture;
pub mod convert;
#[cfg(feature = "microphone")]
pub mod microphone;
pub mod recorder;

pub use capture::{default_input, AudioInput, AudioSpec, CaptureStream, UnavailableInput};
pub use convert::Pcm16Converter;
#[cfg(feature = "microphone")]
pub use microphone::MicrophoneInput;
pub use recorder::{Recorder, RecordingSummary};

//! Capture device traits.

use std::sync::Arc;

use crate::error::TaraError;

/// PCM layout of captured frames: signed 16-bit little-endian samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per channel in one frame.
    pub frame_samples: usize,
}

impl Default for AudioSpec {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            frame_samples: 1024,
        }
    }
}

impl AudioSpec {
    /// Size of one frame in bytes.
    pub fn frame_bytes(&self) -> usize {
        self.frame_samples * self.channels as usize * 2
    }
}

/// An audio source that can be opened for recording.
///
/// `open` runs on the recording worker thread, so the returned stream does
/// not need to be `Send`.
pub trait AudioInput: Send + Sync {
    fn open(&self, spec: &AudioSpec) -> Result<Box<dyn CaptureStream>, TaraError>;
}

/// An open capture stream. Dropping it releases the device.
pub trait CaptureStream {
    /// Block until the next frame is available.
    ///
    /// Returns `Ok(None)` once the source has no more input.
    fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TaraError>;
}

/// Input used when the binary was built without device support.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableInput;

impl AudioInput for UnavailableInput {
    fn open(&self, _spec: &AudioSpec) -> Result<Box<dyn CaptureStream>, TaraError> {
        Err(TaraError::Audio(
            "audio capture is unavailable (build with the `microphone` feature)".into(),
        ))
    }
}

/// The platform's default input.
pub fn default_input() -> Arc<dyn AudioInput> {
    #[cfg(feature = "microphone")]
    {
        Arc::new(super::microphone::MicrophoneInput::default())
    }
    #[cfg(not(feature = "microphone"))]
    {
        Arc::new(UnavailableInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_spec_is_16k_mono_1024() {
        let spec = AudioSpec::default();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.frame_bytes(), 2048);
    }

    #[test]
    fn unavailable_input_reports_audio_error() {
        let result = UnavailableInput.open(&AudioSpec::default());
        assert!(matches!(result, Err(TaraError::Audio(_))));
    }
}

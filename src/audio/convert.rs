//! Device sample conversion: interleaved float input to mono PCM16 at the
//! wire rate.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::warn;

use crate::error::TaraError;

/// Input frames handed to the resampler per call.
const RESAMPLER_CHUNK: usize = 1024;

/// Average interleaved channels into one.
pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Scale `[-1.0, 1.0]` floats to signed 16-bit, clamping out-of-range input.
pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&sample| (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16)
        .collect()
}

/// Streaming converter from a device's native layout to mono PCM16.
///
/// Samples that do not fill a resampler chunk are held until the next push.
pub struct Pcm16Converter {
    channels: usize,
    resampler: Option<FastFixedIn<f32>>,
    pending: Vec<f32>,
}

impl Pcm16Converter {
    pub fn new(source_rate: u32, source_channels: u16, target_rate: u32) -> Result<Self, TaraError> {
        if source_rate == 0 || source_channels == 0 || target_rate == 0 {
            return Err(TaraError::Audio(format!(
                "Unsupported capture format: {source_channels} channel(s) at {source_rate} Hz"
            )));
        }
        let resampler = if source_rate == target_rate {
            None
        } else {
            let resampler = FastFixedIn::<f32>::new(
                f64::from(target_rate) / f64::from(source_rate),
                1.0,
                PolynomialDegree::Cubic,
                RESAMPLER_CHUNK,
                1,
            )
            .map_err(|error| TaraError::Audio(format!("Failed to create resampler: {error}")))?;
            Some(resampler)
        };
        Ok(Self {
            channels: usize::from(source_channels),
            resampler,
            pending: Vec::new(),
        })
    }

    pub fn push(&mut self, interleaved: &[f32]) -> Vec<i16> {
        let mono = downmix(interleaved, self.channels);
        let Some(resampler) = self.resampler.as_mut() else {
            return to_pcm16(&mono);
        };

        self.pending.extend(mono);
        let mut output = Vec::new();
        loop {
            let needed = resampler.input_frames_next();
            if self.pending.len() < needed {
                break;
            }
            let chunk: Vec<f32> = self.pending.drain(..needed).collect();
            match resampler.process(&[chunk], None) {
                Ok(resampled) => {
                    if let Some(channel) = resampled.first() {
                        output.extend(to_pcm16(channel));
                    }
                }
                Err(error) => warn!(error = %error, "dropping audio chunk that failed to resample"),
            }
        }
        output
    }
}

//! Default microphone via `cpal`.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use tracing::{info, warn};

use super::capture::{AudioInput, AudioSpec, CaptureStream};
use super::convert::Pcm16Converter;
use crate::error::TaraError;

const SAMPLE_WAIT: Duration = Duration::from_secs(2);

/// The host's default input device.
///
/// The device is opened in its own default format; samples are downmixed
/// and resampled to the requested spec before framing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MicrophoneInput;

impl AudioInput for MicrophoneInput {
    fn open(&self, spec: &AudioSpec) -> Result<Box<dyn CaptureStream>, TaraError> {
        if spec.channels != 1 {
            return Err(TaraError::Audio(format!(
                "Microphone capture is mono only, {} channels requested",
                spec.channels
            )));
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| TaraError::Audio("No input device available".into()))?;
        let supported = device
            .default_input_config()
            .map_err(|error| TaraError::Audio(format!("No usable input format: {error}")))?;
        let config = supported.config();
        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            format = ?supported.sample_format(),
            "opening microphone"
        );

        let converter =
            Pcm16Converter::new(config.sample_rate.0, config.channels, spec.sample_rate)?;
        let (samples_tx, samples_rx) = mpsc::channel::<Vec<i16>>();
        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, converter, samples_tx),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, converter, samples_tx),
            SampleFormat::I32 => build_stream::<i32>(&device, &config, converter, samples_tx),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, converter, samples_tx),
            other => {
                return Err(TaraError::Audio(format!(
                    "Unsupported microphone sample format: {other:?}"
                )))
            }
        }
        .map_err(|error| TaraError::Audio(format!("Failed to open microphone: {error}")))?;
        stream
            .play()
            .map_err(|error| TaraError::Audio(format!("Failed to start microphone: {error}")))?;

        Ok(Box::new(MicrophoneStream {
            _stream: stream,
            samples_rx,
            pending: VecDeque::new(),
            frame_samples: spec.frame_samples,
        }))
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut converter: Pcm16Converter,
    samples_tx: mpsc::Sender<Vec<i16>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let samples: Vec<f32> = data.iter().map(|sample| sample.to_sample::<f32>()).collect();
            let converted = converter.push(&samples);
            if !converted.is_empty() {
                let _ = samples_tx.send(converted);
            }
        },
        |error| warn!(error = %error, "microphone stream error"),
        None,
    )
}

struct MicrophoneStream {
    _stream: cpal::Stream,
    samples_rx: mpsc::Receiver<Vec<i16>>,
    pending: VecDeque<i16>,
    frame_samples: usize,
}

impl CaptureStream for MicrophoneStream {
    fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TaraError> {
        while self.pending.len() < self.frame_samples {
            match self.samples_rx.recv_timeout(SAMPLE_WAIT) {
                Ok(chunk) => self.pending.extend(chunk),
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    return Err(TaraError::Audio(
                        "microphone stopped delivering samples".into(),
                    ))
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
        let frame = self
            .pending
            .drain(..self.frame_samples)
            .flat_map(i16::to_le_bytes)
            .collect();
        Ok(Some(frame))
    }
}

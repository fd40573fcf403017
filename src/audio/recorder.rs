//! Background recording worker.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use super::capture::{AudioInput, AudioSpec};
use crate::error::TaraError;
use crate::realtime::{ClientEvent, OutboundQueue};

/// What a finished recording produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingSummary {
    pub frames: usize,
    pub bytes: usize,
    /// Whether the append/commit/response events were queued.
    pub sent: bool,
}

/// A running recording.
///
/// The worker reads frames on the blocking pool until cancelled, then
/// queues `input_audio_buffer.append`, `input_audio_buffer.commit` and
/// `response.create`. Dropping the recorder cancels the worker, which then
/// releases the device and flushes on its own.
pub struct Recorder {
    cancel: DropGuard,
    task: JoinHandle<RecordingSummary>,
}

impl Recorder {
    /// Open the input and start capturing.
    ///
    /// Resolves once the device is open, so open failures surface here.
    pub async fn start(
        input: Arc<dyn AudioInput>,
        spec: AudioSpec,
        outbound: OutboundQueue,
    ) -> Result<Self, TaraError> {
        let cancel = CancellationToken::new();
        let (ready_tx, ready_rx) = oneshot::channel();
        let worker_cancel = cancel.clone();
        let task = tokio::task::spawn_blocking(move || {
            capture_until_cancelled(input.as_ref(), &spec, &worker_cancel, ready_tx, &outbound)
        });

        match ready_rx.await {
            Ok(Ok(())) => {
                info!("recording started");
                Ok(Self {
                    cancel: cancel.drop_guard(),
                    task,
                })
            }
            Ok(Err(error)) => {
                let _ = task.await;
                Err(error)
            }
            Err(_) => Err(TaraError::Audio("recording worker exited before opening the device".into())),
        }
    }

    /// Whether the worker already stopped on its own (device ended or failed).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the worker and wait until it has flushed.
    pub async fn stop(self) -> Result<RecordingSummary, TaraError> {
        let Self { cancel, task } = self;
        drop(cancel);
        let summary = task
            .await
            .map_err(|error| TaraError::Audio(format!("recording worker failed: {error}")))?;
        info!(frames = summary.frames, bytes = summary.bytes, "recording stopped");
        Ok(summary)
    }
}

fn capture_until_cancelled(
    input: &dyn AudioInput,
    spec: &AudioSpec,
    cancel: &CancellationToken,
    ready_tx: oneshot::Sender<Result<(), TaraError>>,
    outbound: &OutboundQueue,
) -> RecordingSummary {
    let mut stream = match input.open(spec) {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(error) => {
            let _ = ready_tx.send(Err(error));
            return RecordingSummary::default();
        }
    };

    let mut frames = Vec::new();
    while !cancel.is_cancelled() {
        match stream.read_frame() {
            Ok(Some(frame)) => frames.push(frame),
            Ok(None) => {
                debug!("audio input ended");
                break;
            }
            Err(error) => {
                warn!(error = %error, "audio recording error");
                break;
            }
        }
    }
    drop(stream);

    flush_recording(&frames, outbound)
}

/// Encode buffered frames and queue them as one user turn.
pub(crate) fn flush_recording(frames: &[Vec<u8>], outbound: &OutboundQueue) -> RecordingSummary {
    let pcm = frames.concat();
    let mut summary = RecordingSummary {
        frames: frames.len(),
        bytes: pcm.len(),
        sent: false,
    };
    if pcm.is_empty() {
        debug!("no audio captured, nothing to send");
        return summary;
    }

    info!(bytes = pcm.len(), "sending recorded audio");
    summary.sent = outbound.send_all([
        ClientEvent::audio_append(STANDARD.encode(&pcm)),
        ClientEvent::InputAudioBufferCommit,
        ClientEvent::response_create(),
    ]);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::capture::{CaptureStream, UnavailableInput};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct FiniteInput {
        frames: Vec<Vec<u8>>,
    }

    struct FiniteStream {
        frames: std::vec::IntoIter<Vec<u8>>,
    }

    impl AudioInput for FiniteInput {
        fn open(&self, _spec: &AudioSpec) -> Result<Box<dyn CaptureStream>, TaraError> {
            Ok(Box::new(FiniteStream {
                frames: self.frames.clone().into_iter(),
            }))
        }
    }

    impl CaptureStream for FiniteStream {
        fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TaraError> {
            Ok(self.frames.next())
        }
    }

    /// Endless input that counts how often it was read.
    struct CountingInput {
        reads: Arc<AtomicUsize>,
    }

    struct CountingStream {
        reads: Arc<AtomicUsize>,
    }

    impl AudioInput for CountingInput {
        fn open(&self, _spec: &AudioSpec) -> Result<Box<dyn CaptureStream>, TaraError> {
            Ok(Box::new(CountingStream {
                reads: Arc::clone(&self.reads),
            }))
        }
    }

    impl CaptureStream for CountingStream {
        fn read_frame(&mut self) -> Result<Option<Vec<u8>>, TaraError> {
            std::thread::sleep(Duration::from_millis(5));
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Some(vec![0u8; 4]))
        }
    }

    fn connected_queue() -> (OutboundQueue, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (OutboundQueue::new(tx, Arc::new(AtomicBool::new(true))), rx)
    }

    #[test]
    fn flush_queues_append_commit_response_in_order() {
        let (queue, mut rx) = connected_queue();
        let summary = flush_recording(&[vec![1, 0], vec![2, 0]], &queue);

        assert_eq!(summary, RecordingSummary { frames: 2, bytes: 4, sent: true });
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::audio_append(STANDARD.encode([1u8, 0, 2, 0]))
        );
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::InputAudioBufferCommit);
        assert_eq!(rx.try_recv().unwrap(), ClientEvent::response_create());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn flush_with_no_frames_sends_nothing() {
        let (queue, mut rx) = connected_queue();
        let summary = flush_recording(&[], &queue);
        assert!(!summary.sent);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn recorder_flushes_when_input_ends() {
        let (queue, mut rx) = connected_queue();
        let input = Arc::new(FiniteInput {
            frames: vec![vec![0u8; 4]; 3],
        });

        let recorder = Recorder::start(input, AudioSpec::default(), queue)
            .await
            .unwrap();
        let summary = recorder.stop().await.unwrap();

        assert_eq!(summary.frames, 3);
        assert!(summary.sent);
        let types: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|event| event.event_type())
            .collect();
        assert_eq!(
            types,
            vec![
                "input_audio_buffer.append",
                "input_audio_buffer.commit",
                "response.create"
            ]
        );
    }

    #[tokio::test]
    async fn recorder_start_surfaces_open_failure() {
        let (queue, _rx) = connected_queue();
        let result = Recorder::start(Arc::new(UnavailableInput), AudioSpec::default(), queue).await;
        assert!(matches!(result, Err(TaraError::Audio(_))));
    }

    #[tokio::test]
    async fn recording_while_disconnected_is_not_sent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let queue = OutboundQueue::new(tx, Arc::clone(&connected));
        connected.store(false, Ordering::SeqCst);

        let summary = flush_recording(&[vec![9, 9]], &queue);
        assert!(!summary.sent);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropping_recorder_stops_capture() {
        let (queue, mut rx) = connected_queue();
        let reads = Arc::new(AtomicUsize::new(0));
        let input = Arc::new(CountingInput {
            reads: Arc::clone(&reads),
        });

        let recorder = Recorder::start(input, AudioSpec::default(), queue)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(recorder);

        // Let the read in flight finish, then the count must stay put.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let settled = reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(reads.load(Ordering::SeqCst), settled);
        assert!(settled > 0);

        // The cancelled worker still flushed what it captured.
        assert_eq!(
            rx.recv().await.map(|event| event.event_type()),
            Some("input_audio_buffer.append")
        );
    }
}

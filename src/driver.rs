//! Driver spawns and manages the frame pumping task

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::coordinator::Admission;
use crate::producer::FrameProducer;
use crate::sink::FrameSink;
use crate::source::VideoStreamSource;
use crate::{Result, StreamError};

/// Why the driver task stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The producer reported the end of its stream
    ProducerEnded,
    /// The driver was cancelled
    Cancelled,
    /// The source was shut down by someone else
    SourceShutDown,
    /// The producer failed permanently or too many times in a row
    ProducerFailed,
}

/// Summary returned when the driver task finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverReport {
    /// Frames pushed into the source
    pub frames_submitted: u64,
    /// Producer errors seen over the task's lifetime
    pub producer_errors: u64,
    /// Why the task stopped
    pub exit: DriverExit,
}

/// Handle to a running driver task
///
/// Dropping the handle cancels the task.
pub struct DriverHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<DriverReport>>,
}

impl DriverHandle {
    /// Ask the task to stop; it shuts the source down on its way out
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token observed by the task, for tying it to a wider shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the task has finished
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Wait for the task to finish
    pub async fn join(mut self) -> Result<DriverReport> {
        let Some(task) = self.task.take() else {
            return Err(StreamError::producer_failed("driver task already joined"));
        };
        task.await
            .map_err(|e| StreamError::producer_failed_with_source("driver task failed", Box::new(e)))
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            debug!("Dropping driver handle");
        }
        self.cancel.cancel();
    }
}

/// Driver pumps frames from a producer into a source
///
/// The spawned task owns the producer. Whatever makes it stop (end of stream,
/// cancellation, repeated producer errors, or an external shutdown) it shuts
/// the source down before exiting, so no pull request outlives the producer.
pub struct Driver;

impl Driver {
    /// Spawn a driver task on the current tokio runtime
    pub fn spawn<P, S, F>(producer: F, source: Arc<VideoStreamSource<P, S>>) -> DriverHandle
    where
        P: Send + 'static,
        S: FrameSink<P> + 'static,
        F: FrameProducer<P>,
    {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let task = tokio::spawn(async move { Self::pump_task(producer, source, cancel_task).await });

        DriverHandle { cancel, task: Some(task) }
    }

    async fn pump_task<P, S, F>(
        mut producer: F,
        source: Arc<VideoStreamSource<P, S>>,
        cancel: CancellationToken,
    ) -> DriverReport
    where
        P: Send + 'static,
        S: FrameSink<P> + 'static,
        F: FrameProducer<P>,
    {
        let max_errors = source.config().max_producer_errors.max(1);
        let mut frames_submitted = 0u64;
        let mut producer_errors = 0u64;
        let mut error_count = 0u32;

        info!(frame_rate = ?producer.frame_rate(), "Frame pump task started");

        let exit = loop {
            // Check for cancellation between frames
            if cancel.is_cancelled() {
                info!("Frame pump cancelled");
                break DriverExit::Cancelled;
            }

            // Use select to allow cancellation during producer.next_frame()
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Frame pump cancelled during read");
                    break DriverExit::Cancelled;
                }
                result = producer.next_frame() => result,
            };

            match result {
                Ok(Some(frame)) => {
                    error_count = 0;
                    let pts = frame.presentation_time;
                    let outcome = source.submit(frame);
                    if outcome.admission == Admission::Dropped {
                        debug!("Source shut down externally, stopping pump");
                        break DriverExit::SourceShutDown;
                    }
                    frames_submitted += 1;
                    trace!(
                        "Frame {}: pts={}, admission={:?}, delivered={}",
                        frames_submitted, pts, outcome.admission, outcome.delivered
                    );
                }
                Ok(None) => {
                    info!("Producer stream ended after {} frames", frames_submitted);
                    break DriverExit::ProducerEnded;
                }
                Err(e) => {
                    // Producer error - don't stop on transient failures
                    error_count += 1;
                    producer_errors += 1;
                    error!("Producer error ({}/{}): {}", error_count, max_errors, e);

                    if !e.is_retryable() {
                        error!("Producer error is not retryable, shutting down");
                        break DriverExit::ProducerFailed;
                    }
                    if error_count >= max_errors {
                        error!("Too many producer errors, shutting down");
                        break DriverExit::ProducerFailed;
                    }

                    // Exponential backoff: 100ms, 200ms, 400ms, ... capped at 1.6s
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            warn!("Frame pump cancelled during backoff");
                            break DriverExit::Cancelled;
                        }
                        _ = tokio::time::sleep(backoff) => {}
                    }
                }
            }
        };

        let _ = source.shutdown();
        info!(?exit, "Frame pump task ended (submitted {} frames)", frames_submitted);

        DriverReport { frames_submitted, producer_errors, exit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producers::{ChannelProducer, ReplayProducer};
    use crate::test_utils::{Recorded, RecordingSink, numbered_frame};
    use crate::types::{Frame, SourceConfig, StreamDescription};

    type TestSource = VideoStreamSource<u64, RecordingSink<u64>>;

    fn source(config: SourceConfig) -> Arc<TestSource> {
        Arc::new(
            VideoStreamSource::new(config, StreamDescription::h264(320, 240), RecordingSink::new())
                .expect("valid config"),
        )
    }

    /// Producer that fails a fixed number of times before yielding frames
    struct FlakyProducer {
        failures: u32,
        frames: Vec<Frame<u64>>,
    }

    #[async_trait::async_trait]
    impl FrameProducer<u64> for FlakyProducer {
        async fn next_frame(&mut self) -> Result<Option<Frame<u64>>> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(StreamError::producer_failed("decoder hiccup"));
            }
            Ok(self.frames.pop())
        }
    }

    #[tokio::test]
    async fn pump_ends_with_producer_and_discharges_requests() {
        let _ = tracing_subscriber::fmt::try_init();

        let source = source(SourceConfig::default().with_max_queue_size(2));
        let producer = ReplayProducer::new((1..=3).map(numbered_frame));
        let handle = Driver::spawn(producer, Arc::clone(&source));

        let report = handle.join().await.expect("driver task completes");
        assert_eq!(report.exit, DriverExit::ProducerEnded);
        assert_eq!(report.frames_submitted, 3);
        assert!(source.is_shut_down());

        // A late request is ignored rather than left hanging
        assert_eq!(source.request_next_frame(), crate::RequestOutcome::Ignored);
    }

    #[tokio::test]
    async fn pending_request_is_discharged_when_producer_ends() {
        let source = source(SourceConfig::default());
        let _ = source.request_next_frame();
        let _ = source.request_next_frame();

        let handle = Driver::spawn(ReplayProducer::new([numbered_frame(1)]), Arc::clone(&source));
        let report = handle.join().await.expect("driver task completes");

        assert_eq!(report.exit, DriverExit::ProducerEnded);
        assert_eq!(
            source.sink().events(),
            vec![Recorded::Delivered(numbered_frame(1)), Recorded::Terminated]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let source = source(SourceConfig::default());
        let producer = FlakyProducer { failures: 2, frames: vec![numbered_frame(9)] };

        let report = Driver::spawn(producer, Arc::clone(&source)).join().await.expect("completes");
        assert_eq!(report.exit, DriverExit::ProducerEnded);
        assert_eq!(report.producer_errors, 2);
        assert_eq!(report.frames_submitted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_errors_stop_the_pump() {
        let source = source(SourceConfig::default().with_max_producer_errors(3));
        let producer = FlakyProducer { failures: 10, frames: vec![] };

        let report = Driver::spawn(producer, Arc::clone(&source)).join().await.expect("completes");
        assert_eq!(report.exit, DriverExit::ProducerFailed);
        assert_eq!(report.producer_errors, 3);
        assert!(source.is_shut_down());
    }

    #[tokio::test]
    async fn cancel_stops_a_waiting_pump() {
        let source = source(SourceConfig::default());
        let (_tx, producer) = ChannelProducer::<u64>::new(4);
        let _ = source.request_next_frame();

        let handle = Driver::spawn(producer, Arc::clone(&source));
        handle.cancel();
        let report = handle.join().await.expect("completes");

        assert_eq!(report.exit, DriverExit::Cancelled);
        assert_eq!(source.sink().events(), vec![Recorded::Terminated]);
    }

    #[tokio::test]
    async fn shared_token_cancels_the_pump() {
        let source = source(SourceConfig::default());
        let (_tx, producer) = ChannelProducer::<u64>::new(4);

        let handle = Driver::spawn(producer, Arc::clone(&source));
        let token = handle.cancellation_token();
        assert!(!handle.is_finished());

        token.cancel();
        while !handle.is_finished() {
            tokio::task::yield_now().await;
        }
        let report = handle.join().await.expect("completes");
        assert_eq!(report.exit, DriverExit::Cancelled);
        assert!(source.is_shut_down());
    }

    #[tokio::test]
    async fn external_shutdown_stops_the_pump() {
        let source = source(SourceConfig::default());
        let (tx, producer) = ChannelProducer::new(4);
        let handle = Driver::spawn(producer, Arc::clone(&source));

        let _ = tx.send(Ok(numbered_frame(1))).await;
        let _ = source.shutdown();
        let _ = tx.send(Ok(numbered_frame(2))).await;

        let report = handle.join().await.expect("completes");
        assert_eq!(report.exit, DriverExit::SourceShutDown);
    }
}

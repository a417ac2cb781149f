//! Host-facing video stream source
//!
//! [`VideoStreamSource`] is what a media host holds on to. The decode pipeline
//! pushes frames into it with [`submit_frame`](VideoStreamSource::submit_frame),
//! the renderer pulls with
//! [`request_next_frame`](VideoStreamSource::request_next_frame), and the
//! host's [`FrameSink`] hears about every completion.
//!
//! ```rust
//! use framegate::{FrameSink, Frame, SourceConfig, StreamDescription, VideoStreamSource};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Renderer {
//!     shown: Mutex<Vec<u64>>,
//! }
//!
//! impl FrameSink<Vec<u8>> for Renderer {
//!     fn on_frame_delivered(&self, frame: Frame<Vec<u8>>) {
//!         self.shown.lock().unwrap().push(frame.presentation_time);
//!     }
//!     fn on_delivery_terminated(&self) {}
//! }
//!
//! let source = VideoStreamSource::<Vec<u8>, _>::new(
//!     SourceConfig::default(),
//!     StreamDescription::h264(1280, 720),
//!     Renderer::default(),
//! )?;
//!
//! source.request_next_frame();
//! source.submit_frame(vec![0u8; 32], 1_000, 166_667);
//! assert_eq!(*source.sink().shown.lock().unwrap(), vec![1_000]);
//!
//! source.shutdown();
//! # Ok::<(), framegate::StreamError>(())
//! ```

use tracing::info;

use crate::coordinator::{DeliveryCoordinator, FrameOutcome, RequestOutcome, ShutdownOutcome};
use crate::sink::FrameSink;
use crate::types::{DeliveryStats, Frame, MediaKind, SourceConfig, StreamDescription};
use crate::{Result, StreamError};

/// Bounded push-to-pull bridge for a single video stream
#[derive(Debug)]
pub struct VideoStreamSource<P, S> {
    coordinator: DeliveryCoordinator<P, S>,
    description: StreamDescription,
}

impl<P, S> VideoStreamSource<P, S>
where
    S: FrameSink<P>,
{
    /// Create a source after validating its config
    pub fn new(config: SourceConfig, description: StreamDescription, sink: S) -> Result<Self> {
        config.validate()?;

        info!(
            fourcc = %description.fourcc,
            width = description.width,
            height = description.height,
            max_queue_size = config.max_queue_size,
            overflow = ?config.overflow,
            discharge = ?config.discharge,
            "Video stream source created"
        );

        Ok(Self { coordinator: DeliveryCoordinator::new(config, sink), description })
    }

    /// Push a decoded frame from the pipeline. Never blocks on the consumer.
    pub fn submit_frame(&self, payload: P, presentation_time: u64, duration: u64) -> FrameOutcome {
        self.coordinator.on_frame_arrived(Frame::new(payload, presentation_time, duration))
    }

    /// Push an already assembled frame
    pub fn submit(&self, frame: Frame<P>) -> FrameOutcome {
        self.coordinator.on_frame_arrived(frame)
    }

    /// Ask for the next frame. The answer arrives through the sink, possibly
    /// before this call returns.
    pub fn request_next_frame(&self) -> RequestOutcome {
        self.coordinator.request_next()
    }

    /// Ask for the next sample of the given stream type.
    ///
    /// Only video is carried; an audio request is refused without touching
    /// the outstanding count.
    pub fn request_sample(&self, kind: MediaKind) -> Result<RequestOutcome> {
        match kind {
            MediaKind::Video => Ok(self.request_next_frame()),
            MediaKind::Audio => Err(StreamError::UnsupportedMediaKind { kind }),
        }
    }

    /// Stop delivering and discharge pending requests. Idempotent.
    pub fn shutdown(&self) -> ShutdownOutcome {
        self.coordinator.shutdown()
    }
}

impl<P, S> VideoStreamSource<P, S> {
    pub fn description(&self) -> &StreamDescription {
        &self.description
    }

    pub fn config(&self) -> &SourceConfig {
        self.coordinator.config()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.coordinator.stats()
    }

    pub fn outstanding(&self) -> u64 {
        self.coordinator.outstanding()
    }

    pub fn buffered(&self) -> usize {
        self.coordinator.buffered()
    }

    pub fn is_shut_down(&self) -> bool {
        self.coordinator.is_shut_down()
    }

    pub fn sink(&self) -> &S {
        self.coordinator.sink()
    }

    pub fn coordinator(&self) -> &DeliveryCoordinator<P, S> {
        &self.coordinator
    }
}

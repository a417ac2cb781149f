//! Bounded push-to-pull frame hand-off for video renderers.
//!
//! Framegate sits between a decode pipeline that pushes frames at its own
//! pace and a renderer that pulls one frame at a time with asynchronous
//! requests. It buffers a small, fixed number of frames (dropping the oldest
//! when full), answers each pull request as soon as a frame is available,
//! and guarantees that every pending request is answered when the stream
//! shuts down.
//!
//! # Features
//!
//! - **Bounded memory**: the buffer never exceeds its configured capacity
//! - **Freshness**: overflow evicts the oldest frame by default
//! - **No leaked requests**: shutdown discharges every outstanding request
//! - **Callback or async**: implement [`FrameSink`] or consume a [`FrameStream`]
//!
//! ## Example (async consumer)
//!
//! ```rust
//! use framegate::{Framegate, SourceConfig, StreamDescription};
//! use futures::StreamExt;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> framegate::Result<()> {
//!     let (source, mut frames) =
//!         Framegate::stream::<Vec<u8>>(SourceConfig::default(), StreamDescription::h264(1920, 1080))?;
//!
//!     source.submit_frame(vec![0u8; 64], 0, 166_667);
//!     source.submit_frame(vec![1u8; 64], 166_667, 166_667);
//!     source.shutdown();
//!
//!     // Shutdown released the buffered frames, so the stream ends at once
//!     assert!(frames.next().await.is_none());
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Delivery core
pub mod buffer;
pub mod coordinator;
pub mod sink;
pub mod source;

// Async consumption and production
pub mod driver;
pub mod producer;
pub mod producers;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

pub use buffer::{FrameBuffer, Submitted};
pub use coordinator::{
    Admission, DeliveryCoordinator, FrameOutcome, RequestOutcome, ShutdownOutcome,
};
pub use sink::FrameSink;
pub use source::VideoStreamSource;

// Async exports
pub use driver::{Driver, DriverExit, DriverHandle, DriverReport};
pub use producer::FrameProducer;
pub use producers::{ChannelProducer, ReplayProducer};
pub use stream::{ChannelSink, ChannelSource, Completion, FrameStream};

use std::sync::Arc;

/// Unified entry point for building video stream sources.
///
/// # Examples
///
/// ## Callback consumer
/// ```rust
/// use framegate::{Frame, FrameSink, Framegate, SourceConfig, StreamDescription};
///
/// struct Renderer;
///
/// impl FrameSink<Vec<u8>> for Renderer {
///     fn on_frame_delivered(&self, frame: Frame<Vec<u8>>) {
///         println!("render pts={}", frame.presentation_time);
///     }
///     fn on_delivery_terminated(&self) {
///         println!("stream closed");
///     }
/// }
///
/// let source = Framegate::source::<Vec<u8>, _>(
///     SourceConfig::default(),
///     StreamDescription::h264(1280, 720),
///     Renderer,
/// )?;
/// source.request_next_frame();
/// source.submit_frame(vec![0u8; 8], 0, 166_667);
/// # Ok::<(), framegate::StreamError>(())
/// ```
///
/// ## Replay into an async consumer
///
/// An unpaced replay can run out and shut the source down before the
/// consumer pulls anything, so the loop below may print anywhere from zero
/// to three frames. Drive a [`ReplayProducer::paced`] replay with
/// [`Driver::spawn`] to give the consumer time between frames.
///
/// ```rust
/// use framegate::{Frame, Framegate, SourceConfig, StreamDescription};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> framegate::Result<()> {
/// let frames = (0..3u64).map(|n| Frame::new(n, n * 10, 10));
/// let (mut stream, driver) =
///     Framegate::replay(frames, SourceConfig::default(), StreamDescription::h264(640, 480))?;
///
/// while let Some(frame) = stream.next_frame().await {
///     println!("frame {}", frame.payload);
/// }
/// driver.join().await?;
/// # Ok(())
/// # }
/// ```
pub struct Framegate;

impl Framegate {
    /// Create a source that reports completions to a host sink
    pub fn source<P, S>(
        config: SourceConfig,
        description: StreamDescription,
        sink: S,
    ) -> Result<VideoStreamSource<P, S>>
    where
        S: FrameSink<P>,
    {
        VideoStreamSource::new(config, description, sink)
    }

    /// Create a shared source and an async stream pulling from it
    pub fn stream<P: Send>(
        config: SourceConfig,
        description: StreamDescription,
    ) -> Result<(Arc<ChannelSource<P>>, FrameStream<P>)> {
        FrameStream::open(config, description)
    }

    /// Replay prerecorded frames through a driver into an async stream.
    ///
    /// The driver shuts the source down when the replay runs out, which
    /// releases frames the consumer has not pulled yet, so how many frames
    /// the stream yields depends on scheduling. Must be called from within a
    /// tokio runtime.
    pub fn replay<P: Send + 'static>(
        frames: impl IntoIterator<Item = Frame<P>>,
        config: SourceConfig,
        description: StreamDescription,
    ) -> Result<(FrameStream<P>, DriverHandle)> {
        let (source, stream) = FrameStream::open(config, description)?;
        let driver = Driver::spawn(ReplayProducer::new(frames), source);
        Ok((stream, driver))
    }
}

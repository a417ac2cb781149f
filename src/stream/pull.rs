//! Pull-driven frame stream for async renderers

use futures::Stream;
use futures::stream::FusedStream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::debug;

use super::channel::{ChannelSink, Completion, CompletionReceiver, channel_sink};
use crate::Result;
use crate::coordinator::RequestOutcome;
use crate::source::VideoStreamSource;
use crate::types::{Frame, SourceConfig, StreamDescription};

/// Source whose completions flow into a channel
pub type ChannelSource<P> = VideoStreamSource<P, ChannelSink<P>>;

/// Stream of frames pulled one request at a time.
///
/// Polling with no request in flight issues exactly one
/// [`request_next_frame`](VideoStreamSource::request_next_frame) and then
/// waits for its completion. The stream ends when the source shuts down.
/// It assumes it is the only consumer of the source it wraps.
///
/// ```rust
/// use framegate::{FrameStream, SourceConfig, StreamDescription};
/// use futures::StreamExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> framegate::Result<()> {
/// let (source, mut frames) =
///     FrameStream::<Vec<u8>>::open(SourceConfig::default(), StreamDescription::h264(640, 480))?;
///
/// source.submit_frame(vec![1, 2, 3], 0, 166_667);
/// let frame = frames.next().await.expect("frame was buffered");
/// assert_eq!(frame.payload, vec![1, 2, 3]);
///
/// source.shutdown();
/// assert!(frames.next().await.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FrameStream<P> {
    source: Arc<ChannelSource<P>>,
    completions: CompletionReceiver<P>,
    in_flight: bool,
    finished: bool,
}

// No field is ever pinned
impl<P> Unpin for FrameStream<P> {}

impl<P: Send> FrameStream<P> {
    /// Wrap a source that reports into the sender paired with `completions`
    pub fn new(source: Arc<ChannelSource<P>>, completions: CompletionReceiver<P>) -> Self {
        Self { source, completions, in_flight: false, finished: false }
    }

    /// Create a shared source and a stream pulling from it
    pub fn open(
        config: SourceConfig,
        description: StreamDescription,
    ) -> Result<(Arc<ChannelSource<P>>, Self)> {
        let (sink, completions) = channel_sink();
        let source = Arc::new(VideoStreamSource::new(config, description, sink)?);
        let stream = Self::new(Arc::clone(&source), completions);
        Ok((source, stream))
    }

    /// The source this stream pulls from
    pub fn source(&self) -> &Arc<ChannelSource<P>> {
        &self.source
    }

    /// Whether a request is waiting for its completion
    pub fn has_request_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Wait for the next frame, `None` once the source is shut down
    pub async fn next_frame(&mut self) -> Option<Frame<P>> {
        std::future::poll_fn(|cx| self.poll_frame(cx)).await
    }

    fn poll_frame(&mut self, cx: &mut Context<'_>) -> Poll<Option<Frame<P>>> {
        if self.finished {
            return Poll::Ready(None);
        }

        if !self.in_flight {
            match self.source.request_next_frame() {
                RequestOutcome::Ignored => {
                    debug!("Frame stream ended: source already shut down");
                    self.finished = true;
                    return Poll::Ready(None);
                }
                RequestOutcome::Delivered | RequestOutcome::Pending => {
                    self.in_flight = true;
                }
            }
        }

        match self.completions.poll_recv(cx) {
            Poll::Ready(Some(Completion::Delivered(frame))) => {
                self.in_flight = false;
                Poll::Ready(Some(frame))
            }
            Poll::Ready(Some(Completion::Terminated)) | Poll::Ready(None) => {
                debug!("Frame stream ended: source shut down");
                self.in_flight = false;
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<P: Send> Stream for FrameStream<P> {
    type Item = Frame<P>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_frame(cx)
    }
}

impl<P: Send> FusedStream for FrameStream<P> {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

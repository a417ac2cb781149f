//! Producer fed by another task through a bounded channel

use tokio::sync::mpsc;
use tracing::debug;

use crate::Result;
use crate::producer::FrameProducer;
use crate::types::Frame;

/// Sending half for a [`ChannelProducer`]
pub type FrameSender<P> = mpsc::Sender<Result<Frame<P>>>;

/// Producer that yields whatever a decode task sends it.
///
/// The stream ends when every sender is dropped. Errors sent through the
/// channel are surfaced to the driver as producer errors.
pub struct ChannelProducer<P> {
    rx: mpsc::Receiver<Result<Frame<P>>>,
}

impl<P> ChannelProducer<P> {
    /// Create a producer and its sender with room for `capacity` frames in
    /// flight
    pub fn new(capacity: usize) -> (FrameSender<P>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self { rx })
    }
}

#[async_trait::async_trait]
impl<P: Send + 'static> FrameProducer<P> for ChannelProducer<P> {
    async fn next_frame(&mut self) -> Result<Option<Frame<P>>> {
        match self.rx.recv().await {
            Some(Ok(frame)) => Ok(Some(frame)),
            Some(Err(e)) => Err(e),
            None => {
                debug!("All frame senders dropped");
                Ok(None)
            }
        }
    }
}

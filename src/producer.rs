//! Producer trait for frame sources

use crate::Result;
use crate::types::Frame;

/// Trait for upstream frame sources
///
/// Producers abstract over where decoded frames come from (a network decode
/// pipeline, a replay list, a channel fed by another task) and handle their
/// own timing internally. The [`Driver`](crate::Driver) polls a producer and
/// pushes every frame into a source.
#[async_trait::async_trait]
pub trait FrameProducer<P>: Send + 'static {
    /// Get the next decoded frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Stream ended (normal termination)
    /// - `Err(e)` - Error occurred; the driver retries with backoff
    async fn next_frame(&mut self) -> Result<Option<Frame<P>>>;

    /// Nominal frame rate in Hz, if the producer knows it
    fn frame_rate(&self) -> Option<f64> {
        None
    }
}

//! Sink that forwards completions into a tokio channel

use tokio::sync::mpsc;
use tracing::trace;

use crate::sink::FrameSink;
use crate::types::Frame;

/// A completion as seen by an async consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<P> {
    /// A request was answered with this frame
    Delivered(Frame<P>),
    /// Pending requests were discharged because the source shut down
    Terminated,
}

/// Receiving half paired with a [`ChannelSink`]
pub type CompletionReceiver<P> = mpsc::UnboundedReceiver<Completion<P>>;

/// [`FrameSink`] that pushes every completion into an unbounded channel.
///
/// Sending never blocks, so it is safe inside the coordinator's critical
/// section. The channel holds at most one entry per outstanding request.
#[derive(Debug)]
pub struct ChannelSink<P> {
    tx: mpsc::UnboundedSender<Completion<P>>,
}

impl<P> Clone for ChannelSink<P> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<P> ChannelSink<P> {
    /// Whether the receiving side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create a channel sink and its receiver
pub fn channel_sink<P>() -> (ChannelSink<P>, CompletionReceiver<P>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelSink { tx }, rx)
}

impl<P: Send> FrameSink<P> for ChannelSink<P> {
    fn on_frame_delivered(&self, frame: Frame<P>) {
        if self.tx.send(Completion::Delivered(frame)).is_err() {
            trace!("Completion receiver dropped, discarding frame");
        }
    }

    fn on_delivery_terminated(&self) {
        if self.tx.send(Completion::Terminated).is_err() {
            trace!("Completion receiver dropped, discarding termination");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::numbered_frame;

    #[test]
    fn completions_arrive_in_order() {
        let (sink, mut rx) = channel_sink::<u64>();
        sink.on_frame_delivered(numbered_frame(1));
        sink.on_delivery_terminated();

        assert_eq!(rx.try_recv().ok(), Some(Completion::Delivered(numbered_frame(1))));
        assert_eq!(rx.try_recv().ok(), Some(Completion::Terminated));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_receiver_closes_the_sink() {
        let (sink, rx) = channel_sink::<u64>();
        let other = sink.clone();
        assert!(!sink.is_closed());

        drop(rx);
        assert!(sink.is_closed());
        assert!(other.is_closed());

        // Completions into a closed channel are discarded quietly
        sink.on_frame_delivered(numbered_frame(2));
        sink.on_delivery_terminated();
    }
}

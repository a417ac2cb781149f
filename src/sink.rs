//! Completion callbacks toward the media host

use std::sync::Arc;

use crate::types::Frame;

/// Receiver of completions for pull requests.
///
/// The host implements this to learn when a request has been answered. Every
/// accepted request is answered by exactly one of the two methods, except
/// that a coalesced shutdown answers all outstanding requests with a single
/// [`on_delivery_terminated`](FrameSink::on_delivery_terminated).
///
/// Callbacks run inside the coordinator's critical section, on the thread
/// that caused the completion. They may call back into the same source on
/// that thread, but must not block waiting for another thread that uses it.
pub trait FrameSink<P>: Send + Sync {
    /// A pending request was satisfied with this frame
    fn on_frame_delivered(&self, frame: Frame<P>);

    /// A pending request was discharged without a frame because the source
    /// shut down
    fn on_delivery_terminated(&self);
}

impl<P, S: FrameSink<P> + ?Sized> FrameSink<P> for Arc<S> {
    fn on_frame_delivered(&self, frame: Frame<P>) {
        (**self).on_frame_delivered(frame)
    }

    fn on_delivery_terminated(&self) {
        (**self).on_delivery_terminated()
    }
}

impl<P, S: FrameSink<P> + ?Sized> FrameSink<P> for &S {
    fn on_frame_delivered(&self, frame: Frame<P>) {
        (**self).on_frame_delivered(frame)
    }

    fn on_delivery_terminated(&self) {
        (**self).on_delivery_terminated()
    }
}

impl<P, S: FrameSink<P> + ?Sized> FrameSink<P> for Box<S> {
    fn on_frame_delivered(&self, frame: Frame<P>) {
        (**self).on_frame_delivered(frame)
    }

    fn on_delivery_terminated(&self) {
        (**self).on_delivery_terminated()
    }
}

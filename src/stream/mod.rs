//! Async consumption of a video stream source
//!
//! [`ChannelSink`] turns completions into channel messages and
//! [`FrameStream`] turns them back into a `futures::Stream` of frames, so an
//! async renderer can `await` its next frame instead of implementing
//! [`FrameSink`](crate::FrameSink) itself.

mod channel;
mod pull;

pub use channel::{ChannelSink, Completion, CompletionReceiver, channel_sink};
pub use pull::{ChannelSource, FrameStream};

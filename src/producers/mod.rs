//! Ready-made [`FrameProducer`](crate::FrameProducer) implementations

pub mod channel;
pub mod replay;

pub use channel::{ChannelProducer, FrameSender};
pub use replay::ReplayProducer;

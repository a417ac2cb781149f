//! Decoded frame records handed from the producer to the renderer

use std::sync::Arc;

/// A decoded video frame travelling from the decode pipeline to the renderer.
///
/// The payload is an opaque handle; the core never inspects it. Timing values
/// are in whatever monotonic unit the host chose (the reference host uses
/// 100 ns ticks) and are stored and forwarded untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame<P = Arc<[u8]>> {
    /// Decoded payload, owned by whoever currently holds the frame
    pub payload: P,

    /// Presentation timestamp in host units
    pub presentation_time: u64,

    /// Display duration in host units
    pub duration: u64,
}

impl<P> Frame<P> {
    /// Create a new frame
    pub fn new(payload: P, presentation_time: u64, duration: u64) -> Self {
        Self { payload, presentation_time, duration }
    }

    /// Split the frame into its payload and timing
    pub fn into_parts(self) -> (P, u64, u64) {
        (self.payload, self.presentation_time, self.duration)
    }

    /// Replace the payload, keeping the timing
    pub fn map_payload<Q>(self, f: impl FnOnce(P) -> Q) -> Frame<Q> {
        Frame {
            payload: f(self.payload),
            presentation_time: self.presentation_time,
            duration: self.duration,
        }
    }
}

impl Frame<Arc<[u8]>> {
    /// Create a frame from an owned byte buffer (zero-copy afterwards via Arc)
    pub fn from_bytes(data: Vec<u8>, presentation_time: u64, duration: u64) -> Self {
        Self { payload: data.into(), presentation_time, duration }
    }
}

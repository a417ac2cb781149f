//! Test utilities shared by unit tests and benchmarks
//!
//! This module provides a recording sink and frame constructors so tests can
//! assert on the exact sequence of completions a coordinator issues.

#![cfg(any(test, feature = "benchmark"))]

use parking_lot::Mutex;
use std::sync::Arc;

use crate::sink::FrameSink;
use crate::types::Frame;

/// Nominal frame duration used by the constructors (60 fps in 100 ns ticks)
pub const FRAME_DURATION: u64 = 166_667;

/// One completion observed by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded<P> {
    Delivered(Frame<P>),
    Terminated,
}

/// Sink that records every completion in the order it was issued
#[derive(Debug)]
pub struct RecordingSink<P> {
    events: Mutex<Vec<Recorded<P>>>,
}

impl<P> Default for RecordingSink<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> RecordingSink<P> {
    pub fn new() -> Self {
        Self { events: Mutex::new(Vec::new()) }
    }

    /// Number of completions recorded so far
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Number of terminal completions recorded so far
    pub fn terminations(&self) -> usize {
        self.events.lock().iter().filter(|e| matches!(e, Recorded::Terminated)).count()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<Recorded<P>> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl<P: Clone> RecordingSink<P> {
    /// Copy of every completion, in order
    pub fn events(&self) -> Vec<Recorded<P>> {
        self.events.lock().clone()
    }

    /// Payloads of delivered frames, in delivery order
    pub fn delivered_payloads(&self) -> Vec<P> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Recorded::Delivered(frame) => Some(frame.payload.clone()),
                Recorded::Terminated => None,
            })
            .collect()
    }
}

impl<P: Send> FrameSink<P> for RecordingSink<P> {
    fn on_frame_delivered(&self, frame: Frame<P>) {
        self.events.lock().push(Recorded::Delivered(frame));
    }

    fn on_delivery_terminated(&self) {
        self.events.lock().push(Recorded::Terminated);
    }
}

/// Sink that only counts completions, for benchmarks
#[derive(Debug, Default)]
pub struct CountingSink {
    delivered: std::sync::atomic::AtomicU64,
    terminated: std::sync::atomic::AtomicU64,
}

impl CountingSink {
    pub fn delivered(&self) -> u64 {
        self.delivered.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn terminated(&self) -> u64 {
        self.terminated.load(std::sync::atomic::Ordering::Relaxed)
    }
}

impl<P> FrameSink<P> for CountingSink {
    fn on_frame_delivered(&self, frame: Frame<P>) {
        drop(frame);
        self.delivered.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    fn on_delivery_terminated(&self) {
        self.terminated.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }
}

/// Frame whose payload is its sequence number and whose timing follows it
pub fn numbered_frame(n: u64) -> Frame<u64> {
    Frame::new(n, n * FRAME_DURATION, FRAME_DURATION)
}

/// Frame carrying a byte payload of the given size
pub fn byte_frame(n: u64, size: usize) -> Frame<Arc<[u8]>> {
    Frame::from_bytes(vec![(n % 256) as u8; size], n * FRAME_DURATION, FRAME_DURATION)
}

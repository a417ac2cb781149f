//! Bounded FIFO of decoded frames
//!
//! The buffer never holds more than its capacity. What happens to the frame
//! that would overflow it is decided by the [`OverflowPolicy`]; either way the
//! displaced frame is handed back to the caller, which decides when to drop it.

use std::collections::VecDeque;

use crate::types::{Frame, OverflowPolicy};

/// Result of submitting a frame to the buffer
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Submitted<P> {
    /// The frame was appended and nothing was displaced
    Queued,
    /// The frame was appended after evicting the returned oldest frame
    Evicted(Frame<P>),
    /// The buffer was full; the returned incoming frame was not queued
    Rejected(Frame<P>),
}

/// Fixed-capacity frame queue with an overflow policy.
///
/// This type is not synchronized; the coordinator owns it inside its
/// critical section.
#[derive(Debug)]
pub struct FrameBuffer<P> {
    frames: VecDeque<Frame<P>>,
    capacity: usize,
    policy: OverflowPolicy,
}

impl<P> FrameBuffer<P> {
    /// Create a buffer holding at most `capacity` frames.
    ///
    /// A capacity of zero is raised to one; configs are validated before
    /// they reach here.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self { frames: VecDeque::with_capacity(capacity), capacity, policy }
    }

    /// Add a frame at the tail, applying the overflow policy when full
    pub fn submit(&mut self, frame: Frame<P>) -> Submitted<P> {
        if self.frames.len() < self.capacity {
            self.frames.push_back(frame);
            return Submitted::Queued;
        }

        match self.policy {
            OverflowPolicy::RejectNewest => Submitted::Rejected(frame),
            OverflowPolicy::DropOldest => match self.frames.pop_front() {
                Some(oldest) => {
                    self.frames.push_back(frame);
                    Submitted::Evicted(oldest)
                }
                // capacity >= 1 and the buffer is full, so there is a head
                None => {
                    self.frames.push_back(frame);
                    Submitted::Queued
                }
            },
        }
    }

    /// Remove and return the oldest frame
    pub fn try_take(&mut self) -> Option<Frame<P>> {
        self.frames.pop_front()
    }

    /// Oldest frame without removing it
    pub fn peek(&self) -> Option<&Frame<P>> {
        self.frames.front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Buffered frames, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Frame<P>> {
        self.frames.iter()
    }

    /// Drop every buffered frame, returning how many were released
    pub fn clear(&mut self) -> usize {
        let released = self.frames.len();
        self.frames.clear();
        released
    }
}

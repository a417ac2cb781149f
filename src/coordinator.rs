//! Matching of buffered frames to pending pull requests
//!
//! The coordinator owns all mutable delivery state, the frame buffer, the
//! outstanding-request counter and the shutdown latch, in a single state
//! value behind one lock. Every public operation enters that
//! critical section once, updates state, and runs the matching loop before
//! leaving, so completions are issued in the same order the state changes
//! that caused them.
//!
//! # Obligations
//!
//! Each accepted [`request_next`](DeliveryCoordinator::request_next) adds one
//! unit to the outstanding counter. A unit leaves the counter in exactly two
//! ways: a buffered frame is delivered for it, or [`shutdown`] discharges it
//! with a terminal completion. After the latch is set no unit is ever added
//! again and no frame is delivered, so the shutdown discharge is always the
//! last completion the sink sees.
//!
//! # Reentrancy
//!
//! Sink callbacks run with the lock held. The lock is reentrant and the
//! interior borrow is released before each callback, so a sink may call the
//! coordinator again from inside a callback on the same thread (for example
//! to issue the next request as soon as a frame lands). Other threads wait
//! until the outermost operation returns.
//!
//! [`shutdown`]: DeliveryCoordinator::shutdown

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::cell::RefCell;
use tracing::{debug, info, trace};

use crate::buffer::{FrameBuffer, Submitted};
use crate::sink::FrameSink;
use crate::types::{DeliveryStats, DischargePolicy, Frame, SourceConfig};

/// How a submitted frame was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Appended to the buffer
    Queued,
    /// Appended after the oldest buffered frame was evicted
    QueuedWithEviction,
    /// Refused because the buffer was full (reject-newest policy)
    Rejected,
    /// Dropped because the coordinator is shut down
    Dropped,
}

/// Result of [`DeliveryCoordinator::on_frame_arrived`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    /// What happened to the submitted frame
    pub admission: Admission,
    /// Frames delivered by the matching pass that followed
    pub delivered: usize,
}

impl FrameOutcome {
    /// Whether the submission completed at least one pending request
    pub fn completed_request(&self) -> bool {
        self.delivered > 0
    }
}

/// Result of [`DeliveryCoordinator::request_next`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A buffered frame was delivered before the call returned
    Delivered,
    /// No frame was buffered; the request waits for a frame or shutdown
    Pending,
    /// The coordinator is shut down; the request was not accepted
    Ignored,
}

/// Result of [`DeliveryCoordinator::shutdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// This call latched shutdown
    Completed {
        /// Outstanding requests that were discharged
        discharged: u64,
        /// Terminal completions issued to the sink
        terminations: u64,
        /// Buffered frames released without delivery
        released_frames: usize,
    },
    /// An earlier call already latched shutdown; nothing happened
    AlreadyShutDown,
}

/// Everything guarded by the coordinator's lock
#[derive(Debug)]
struct State<P> {
    buffer: FrameBuffer<P>,
    outstanding: u64,
    shutdown: bool,
    stats: DeliveryStats,
}

/// Pairs buffered frames with pending pull requests and signals completions.
///
/// Shared between the producer and consumer contexts, typically through an
/// `Arc`. All operations are total.
pub struct DeliveryCoordinator<P, S> {
    state: ReentrantMutex<RefCell<State<P>>>,
    sink: S,
    config: SourceConfig,
}

impl<P, S> DeliveryCoordinator<P, S>
where
    S: FrameSink<P>,
{
    /// Create a coordinator that reports completions to `sink`
    pub fn new(config: SourceConfig, sink: S) -> Self {
        let buffer = FrameBuffer::new(config.max_queue_size, config.overflow);
        let state = State { buffer, outstanding: 0, shutdown: false, stats: DeliveryStats::default() };
        Self { state: ReentrantMutex::new(RefCell::new(state)), sink, config }
    }

    /// Accept a frame from the producer, then try to satisfy a pending request
    pub fn on_frame_arrived(&self, frame: Frame<P>) -> FrameOutcome {
        let guard = self.state.lock();

        let (admission, displaced) = {
            let mut state = guard.borrow_mut();
            if state.shutdown {
                state.stats.frames_dropped += 1;
                trace!(pts = frame.presentation_time, "Frame arrived after shutdown, dropping");
                (Admission::Dropped, Some(frame))
            } else {
                match state.buffer.submit(frame) {
                    Submitted::Queued => {
                        state.stats.frames_submitted += 1;
                        (Admission::Queued, None)
                    }
                    Submitted::Evicted(oldest) => {
                        state.stats.frames_submitted += 1;
                        state.stats.frames_evicted += 1;
                        debug!(
                            pts = oldest.presentation_time,
                            capacity = state.buffer.capacity(),
                            "Frame buffer full, evicting oldest frame"
                        );
                        (Admission::QueuedWithEviction, Some(oldest))
                    }
                    Submitted::Rejected(newest) => {
                        state.stats.frames_rejected += 1;
                        debug!(
                            pts = newest.presentation_time,
                            capacity = state.buffer.capacity(),
                            "Frame buffer full, rejecting incoming frame"
                        );
                        (Admission::Rejected, Some(newest))
                    }
                }
            }
        };
        drop(displaced);

        let delivered = self.drain_locked(&guard);
        FrameOutcome { admission, delivered }
    }

    /// Register one pull request, completing it immediately if a frame is
    /// buffered
    pub fn request_next(&self) -> RequestOutcome {
        let guard = self.state.lock();

        {
            let mut state = guard.borrow_mut();
            if state.shutdown {
                state.stats.requests_ignored += 1;
                debug!("Request after shutdown ignored");
                return RequestOutcome::Ignored;
            }
            state.outstanding = state.outstanding.saturating_add(1);
            state.stats.requests += 1;
        }

        if self.drain_locked(&guard) > 0 {
            RequestOutcome::Delivered
        } else {
            RequestOutcome::Pending
        }
    }

    /// Run one matching pass, returning the number of frames delivered
    pub fn drain(&self) -> usize {
        let guard = self.state.lock();
        self.drain_locked(&guard)
    }

    /// Latch shutdown and discharge every outstanding request.
    ///
    /// Buffered frames are released. Calling this again is a no-op.
    pub fn shutdown(&self) -> ShutdownOutcome {
        let guard = self.state.lock();

        let (discharged, terminations, released) = {
            let mut state = guard.borrow_mut();
            if state.shutdown {
                return ShutdownOutcome::AlreadyShutDown;
            }
            state.shutdown = true;

            let discharged = std::mem::take(&mut state.outstanding);
            let terminations = match self.config.discharge {
                DischargePolicy::Coalesced => u64::from(discharged > 0),
                DischargePolicy::PerRequest => discharged,
            };
            let released = state.buffer.clear();

            state.stats.requests_discharged += discharged;
            state.stats.terminations += terminations;
            state.stats.frames_released += released as u64;
            (discharged, terminations, released)
        };

        info!(
            discharged,
            terminations,
            released_frames = released,
            policy = ?self.config.discharge,
            "Delivery coordinator shut down"
        );

        for _ in 0..terminations {
            self.sink.on_delivery_terminated();
        }

        ShutdownOutcome::Completed { discharged, terminations, released_frames: released }
    }

    fn drain_locked(&self, guard: &ReentrantMutexGuard<'_, RefCell<State<P>>>) -> usize {
        let mut delivered = 0;

        loop {
            let frame = {
                let mut state = guard.borrow_mut();
                if state.shutdown || state.outstanding == 0 {
                    break;
                }
                let Some(frame) = state.buffer.try_take() else {
                    break;
                };
                state.outstanding -= 1;
                state.stats.frames_delivered += 1;
                frame
            };

            trace!(pts = frame.presentation_time, duration = frame.duration, "Delivering frame");
            self.sink.on_frame_delivered(frame);
            delivered += 1;
        }

        delivered
    }
}

impl<P, S> DeliveryCoordinator<P, S> {
    /// Pending requests not yet answered
    pub fn outstanding(&self) -> u64 {
        self.state.lock().borrow().outstanding
    }

    /// Frames currently buffered
    pub fn buffered(&self) -> usize {
        self.state.lock().borrow().buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().borrow().buffer.capacity()
    }

    pub fn is_shut_down(&self) -> bool {
        self.state.lock().borrow().shutdown
    }

    pub fn stats(&self) -> DeliveryStats {
        self.state.lock().borrow().stats
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Copies of the buffered frames, oldest first
    pub fn buffered_frames(&self) -> Vec<Frame<P>>
    where
        P: Clone,
    {
        self.state.lock().borrow().buffer.iter().cloned().collect()
    }
}

impl<P, S> std::fmt::Debug for DeliveryCoordinator<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.state.lock();
        match guard.try_borrow() {
            Ok(state) => f
                .debug_struct("DeliveryCoordinator")
                .field("buffered", &state.buffer.len())
                .field("capacity", &state.buffer.capacity())
                .field("outstanding", &state.outstanding)
                .field("shutdown", &state.shutdown)
                .finish(),
            Err(_) => f.debug_struct("DeliveryCoordinator").finish_non_exhaustive(),
        }
    }
}

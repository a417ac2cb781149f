//! Delivery counters

use serde::Serialize;

/// Snapshot of the coordinator's counters.
///
/// All counters only ever grow and are updated inside the coordinator's
/// critical section, so one snapshot is internally consistent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryStats {
    /// Frames accepted into the buffer
    pub frames_submitted: u64,
    /// Frames evicted to make room for newer ones
    pub frames_evicted: u64,
    /// Frames refused by a full buffer under reject-newest
    pub frames_rejected: u64,
    /// Frames dropped because they arrived after shutdown
    pub frames_dropped: u64,
    /// Frames released from the buffer at shutdown
    pub frames_released: u64,
    /// Frames handed to the sink
    pub frames_delivered: u64,
    /// Pull requests accepted
    pub requests: u64,
    /// Pull requests ignored after shutdown
    pub requests_ignored: u64,
    /// Terminal completions issued at shutdown
    pub terminations: u64,
    /// Outstanding requests discharged at shutdown
    pub requests_discharged: u64,
}

impl DeliveryStats {
    /// Requests that have received a frame or a discharge
    pub fn requests_settled(&self) -> u64 {
        self.frames_delivered + self.requests_discharged
    }
}

//! Replay producer for prerecorded frames

use std::collections::VecDeque;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::Result;
use crate::producer::FrameProducer;
use crate::types::Frame;

/// Producer that yields a fixed list of frames, optionally paced
pub struct ReplayProducer<P> {
    /// Frames not yet yielded
    frames: VecDeque<Frame<P>>,

    /// Frame pacing interval, `None` to yield as fast as polled
    interval: Option<Interval>,

    /// Nominal rate matching the pacing interval
    frame_rate: Option<f64>,

    /// Frames yielded so far
    yielded: usize,
}

impl<P> ReplayProducer<P> {
    /// Create an unpaced replay of `frames`
    pub fn new(frames: impl IntoIterator<Item = Frame<P>>) -> Self {
        let frames: VecDeque<_> = frames.into_iter().collect();
        info!("Replay producer loaded {} frames", frames.len());
        Self { frames, interval: None, frame_rate: None, yielded: 0 }
    }

    /// Create a replay that yields one frame per `period`
    pub fn paced(frames: impl IntoIterator<Item = Frame<P>>, period: Duration) -> Self {
        let mut producer = Self::new(frames);
        producer.set_period(period);
        producer
    }

    /// Change the pacing period
    pub fn set_period(&mut self, period: Duration) {
        let period = period.max(Duration::from_micros(1));
        let mut pacing = interval(period);
        // Delay rather than burst to catch up
        pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(pacing);
        self.frame_rate = Some(1.0 / period.as_secs_f64());
        debug!("Replay pacing set to {:?}", period);
    }

    /// Frames not yet yielded
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    /// Frames yielded so far
    pub fn yielded(&self) -> usize {
        self.yielded
    }
}

#[async_trait::async_trait]
impl<P: Send + 'static> FrameProducer<P> for ReplayProducer<P> {
    async fn next_frame(&mut self) -> Result<Option<Frame<P>>> {
        if self.frames.is_empty() {
            debug!("Reached end of replay after {} frames", self.yielded);
            return Ok(None);
        }

        if let Some(pacing) = self.interval.as_mut() {
            pacing.tick().await;
        }

        let Some(frame) = self.frames.pop_front() else {
            return Ok(None);
        };
        self.yielded += 1;
        trace!(
            "Replay frame {}/{}: pts={}",
            self.yielded,
            self.yielded + self.frames.len(),
            frame.presentation_time
        );

        Ok(Some(frame))
    }

    fn frame_rate(&self) -> Option<f64> {
        self.frame_rate
    }
}

//! Core types shared by the delivery core and its host.
//!
//! - [`Frame`] is a decoded frame with its presentation timing
//! - [`SourceConfig`] with [`OverflowPolicy`] and [`DischargePolicy`] tunes a source
//! - [`StreamDescription`] and [`MediaKind`] describe the stream to the host
//! - [`DeliveryStats`] exposes the coordinator's counters
//!
//! ## Usage Example
//!
//! ```rust
//! use framegate::types::{Frame, SourceConfig};
//!
//! let frame = Frame::from_bytes(vec![0u8; 16], 333_333, 166_666);
//! assert_eq!(frame.payload.len(), 16);
//!
//! let config = SourceConfig::default().with_max_queue_size(2);
//! assert!(config.validate().is_ok());
//! ```

mod config;
mod frame;
mod media;
mod stats;

pub use config::{
    DEFAULT_MAX_PRODUCER_ERRORS, DEFAULT_MAX_QUEUE_SIZE, DischargePolicy, OverflowPolicy,
    SourceConfig,
};
pub use frame::Frame;
pub use media::{MediaKind, StreamDescription};
pub use stats::DeliveryStats;

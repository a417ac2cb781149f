//! Source configuration
//!
//! Configuration is plain data with serde support so hosts can keep it next
//! to the rest of their settings. Every field has a default, so an empty YAML
//! document yields the reference behavior: four buffered frames, drop-oldest
//! overflow and a single coalesced terminal completion at shutdown.
//!
//! ```rust
//! use framegate::{DischargePolicy, SourceConfig};
//!
//! let config = SourceConfig::from_yaml_str("max_queue_size: 2\ndischarge: per_request\n")?;
//! assert_eq!(config.max_queue_size, 2);
//! assert_eq!(config.discharge, DischargePolicy::PerRequest);
//! # Ok::<(), framegate::StreamError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Result, StreamError};

/// Default frame buffer capacity
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 4;

/// Default number of consecutive producer errors the driver tolerates
pub const DEFAULT_MAX_PRODUCER_ERRORS: u32 = 10;

/// What the frame buffer does when a frame arrives while it is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest buffered frame to make room (freshness first)
    #[default]
    DropOldest,

    /// Refuse the incoming frame and keep the buffer as it is
    RejectNewest,
}

/// How outstanding requests are discharged when the source shuts down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DischargePolicy {
    /// One terminal completion covers every outstanding request
    #[default]
    Coalesced,

    /// One terminal completion per outstanding request
    PerRequest,
}

/// Configuration for a [`VideoStreamSource`](crate::VideoStreamSource)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Maximum number of buffered frames (at least 1)
    pub max_queue_size: usize,

    /// Behavior when a frame arrives at a full buffer
    pub overflow: OverflowPolicy,

    /// Behavior for outstanding requests at shutdown
    pub discharge: DischargePolicy,

    /// Consecutive producer errors before the driver gives up
    pub max_producer_errors: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            overflow: OverflowPolicy::default(),
            discharge: DischargePolicy::default(),
            max_producer_errors: DEFAULT_MAX_PRODUCER_ERRORS,
        }
    }
}

impl SourceConfig {
    /// Parse and validate a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: SourceConfig = if yaml.trim().is_empty() {
            SourceConfig::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| StreamError::config_file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.max_queue_size == 0 {
            return Err(StreamError::invalid_config(
                "max_queue_size",
                "the frame buffer must hold at least one frame",
            ));
        }
        if self.max_producer_errors == 0 {
            return Err(StreamError::invalid_config(
                "max_producer_errors",
                "the driver must tolerate at least one producer error",
            ));
        }
        Ok(())
    }

    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_discharge(mut self, discharge: DischargePolicy) -> Self {
        self.discharge = discharge;
        self
    }

    pub fn with_max_producer_errors(mut self, max_producer_errors: u32) -> Self {
        self.max_producer_errors = max_producer_errors;
        self
    }
}

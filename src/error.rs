//! Error types for the surfaces around the delivery core.
//!
//! The delivery core itself is total: submitting a frame, requesting a frame
//! and shutting down never fail, and report what happened through outcome
//! enums instead. Errors only arise at the edges, when configuration is
//! loaded or validated, when the host routes a pull for a stream type this
//! source does not carry, or when a [`FrameProducer`](crate::FrameProducer)
//! reports a failure to the driver.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use framegate::StreamError;
//!
//! let error = StreamError::producer_failed("decoder stalled");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::MediaKind;

/// Result type alias for framegate operations.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Main error type for framegate operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StreamError {
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Config file error: {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {details}")]
    ConfigParse { details: String },

    #[error("{kind} samples are not supported by this source")]
    UnsupportedMediaKind { kind: MediaKind },

    #[error("Frame producer failed: {reason}")]
    Producer {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StreamError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Producer { .. } => true,
            StreamError::Config { .. } => false,
            StreamError::ConfigParse { .. } => false,
            StreamError::InvalidConfig { .. } => false,
            StreamError::UnsupportedMediaKind { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StreamError::InvalidConfig { .. } => vec![
                "Set max_queue_size to at least 1",
                "Check the config against the documented defaults",
            ],
            StreamError::Config { .. } => vec![
                "Check the config file exists and is readable",
                "Check file permissions",
            ],
            StreamError::ConfigParse { .. } => vec![
                "Check the YAML syntax of the config",
                "Use snake_case names for policy values",
            ],
            StreamError::UnsupportedMediaKind { .. } => vec![
                "Route audio samples to a dedicated audio source",
                "Only request video samples from a video stream source",
            ],
            StreamError::Producer { .. } => vec![
                "Check the upstream network connection",
                "Verify the decoder is still running",
                "Request a key frame to resynchronize the stream",
            ],
        }
    }

    /// Helper constructor for config validation errors.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        StreamError::InvalidConfig { field, reason: reason.into() }
    }

    /// Helper constructor for config file errors with path context.
    pub fn config_file_error(path: PathBuf, source: std::io::Error) -> Self {
        StreamError::Config { path, source }
    }

    /// Helper constructor for producer errors.
    pub fn producer_failed(reason: impl Into<String>) -> Self {
        StreamError::Producer { reason: reason.into(), source: None }
    }

    /// Helper constructor for producer errors with source.
    pub fn producer_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        StreamError::Producer { reason: reason.into(), source: Some(source) }
    }
}

impl From<serde_yaml_ng::Error> for StreamError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        StreamError::ConfigParse { details: err.to_string() }
    }
}

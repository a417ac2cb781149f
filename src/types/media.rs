//! Stream metadata reported to the media host

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media stream a host can pull samples for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Audio => f.write_str("audio"),
        }
    }
}

/// Description of the single video stream a source carries.
///
/// This is what the host advertises when it opens the media session. The
/// stream is live, so it has no fixed duration and cannot seek.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescription {
    /// Codec four-character code (e.g. "H264")
    pub fourcc: String,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

impl StreamDescription {
    /// Create a description for an H.264 stream of the given dimensions
    pub fn h264(width: u32, height: u32) -> Self {
        Self { fourcc: "H264".to_string(), width, height }
    }

    /// Stream type carried by this description
    pub fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    /// Live streams cannot seek
    pub fn can_seek(&self) -> bool {
        false
    }

    /// Total duration, `None` for an unbounded live stream
    pub fn duration(&self) -> Option<std::time::Duration> {
        None
    }
}

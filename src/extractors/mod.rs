use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod metadata;
pub mod resolver;
pub mod transcript;
pub mod youtube;

pub use metadata::MetadataRetriever;
pub use resolver::{parse_video_id, resolve_video_id, ResolveError};
pub use transcript::{segments_to_text, TranscriptError, TranscriptRetriever};

use crate::Result;

/// Canonical YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Individual transcript segment returned by a transcript service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Segment text
    pub text: String,

    /// Start time in seconds
    #[serde(default)]
    pub start: f64,

    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: 0.0,
            duration: 0.0,
        }
    }
}

/// Raw metadata as reported by a metadata service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub title: Option<String>,
    pub views: Option<u64>,
}

/// Display metadata for one reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Video title, `None` only when the lookup failed entirely
    pub title: Option<String>,

    /// Formatted view count, e.g. "1,234 views"
    pub views: Option<String>,

    /// The reference exactly as supplied by the caller
    pub target_url: String,
}

impl VideoMetadata {
    /// Metadata for a reference whose lookup failed
    pub fn unavailable(target_url: &str) -> Self {
        Self {
            title: None,
            views: None,
            target_url: target_url.to_string(),
        }
    }
}

/// Service that knows a video's display metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Look up title and view count for a reference URL
    async fn video_details(&self, url: &str) -> Result<VideoDetails>;
}

/// Service that provides transcript segments for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Fetch transcript segments, trying `languages` in order (empty means service default)
    async fn transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptError>;
}

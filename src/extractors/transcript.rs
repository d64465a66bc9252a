use std::sync::Arc;
use thiserror::Error;

use super::{TranscriptSegment, TranscriptService, VideoId};

/// Reasons a transcript could not be retrieved
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("transcripts are disabled for video {video_id}")]
    Disabled { video_id: String },

    #[error("no transcript for video {video_id} in {requested:?} (available: {available:?})")]
    NotFound {
        video_id: String,
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Join the trimmed text of every non-empty segment with single spaces
pub fn segments_to_text(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Best-effort transcript retrieval reduced to plain text
#[derive(Clone)]
pub struct TranscriptRetriever {
    service: Arc<dyn TranscriptService>,
}

impl TranscriptRetriever {
    pub fn new(service: Arc<dyn TranscriptService>) -> Self {
        Self { service }
    }

    /// Fetch the transcript text for a video
    ///
    /// Returns `None` when the service has no transcript or fails. A transcript whose
    /// segments are all blank yields `Some("")`.
    pub async fn fetch_text(&self, video_id: &VideoId, languages: &[String]) -> Option<String> {
        let segments = match self.service.transcript(video_id.as_str(), languages).await {
            Ok(segments) => segments,
            Err(err @ (TranscriptError::Disabled { .. } | TranscriptError::NotFound { .. })) => {
                tracing::warn!(video_id = %video_id, "Transcript not available: {}", err);
                return None;
            }
            Err(TranscriptError::Other(err)) => {
                tracing::error!(
                    video_id = %video_id,
                    "Unexpected error while fetching transcript: {:#}",
                    err
                );
                return None;
            }
        };

        if segments.is_empty() {
            tracing::debug!(video_id = %video_id, "Transcript service returned no segments");
            return None;
        }

        Some(segments_to_text(&segments))
    }
}

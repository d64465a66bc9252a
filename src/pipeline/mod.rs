use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::extractors::{
    resolve_video_id, MetadataRetriever, MetadataService, TranscriptRetriever, TranscriptService,
    VideoMetadata,
};

/// One exported row: display metadata plus transcript text for a resolved reference
///
/// Every record carries all four fields, in this order, even when a value is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub title: Option<String>,
    pub views: Option<String>,
    pub target_url: String,
    pub transcript: Option<String>,
}

impl Record {
    /// Serialized field names, in output order
    pub const FIELD_NAMES: [&'static str; 4] = ["title", "views", "target_url", "transcript"];

    pub fn from_parts(metadata: VideoMetadata, transcript: Option<String>) -> Self {
        Self {
            title: metadata.title,
            views: metadata.views,
            target_url: metadata.target_url,
            transcript,
        }
    }

    /// Field names this record carries
    pub fn field_names(&self) -> &'static [&'static str] {
        &Self::FIELD_NAMES
    }

    /// Value of a field by name; `None` for null values and unknown names
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => self.title.as_deref(),
            "views" => self.views.as_deref(),
            "target_url" => Some(self.target_url.as_str()),
            "transcript" => self.transcript.as_deref(),
            _ => None,
        }
    }
}

/// Builds one record per reference from the resolver and both retrievers
pub struct ScrapePipeline {
    metadata: MetadataRetriever,
    transcripts: TranscriptRetriever,
    languages: Vec<String>,
    show_progress: bool,
}

impl ScrapePipeline {
    /// Create a pipeline; an empty `languages` list leaves the choice to the transcript service
    pub fn new(
        metadata_service: Arc<dyn MetadataService>,
        transcript_service: Arc<dyn TranscriptService>,
        languages: Vec<String>,
    ) -> Self {
        Self {
            metadata: MetadataRetriever::new(metadata_service),
            transcripts: TranscriptRetriever::new(transcript_service),
            languages,
            show_progress: false,
        }
    }

    /// Show a progress bar while processing a batch
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Build the record for one reference, or `None` if it cannot be resolved
    pub async fn build(&self, reference: &str) -> Option<Record> {
        let video_id = resolve_video_id(reference).ok()?;

        let (metadata, transcript) = tokio::join!(
            self.metadata.fetch_metadata(reference),
            self.transcripts.fetch_text(&video_id, &self.languages),
        );

        Some(Record::from_parts(metadata, transcript))
    }

    /// Process references strictly in order, skipping the ones that do not resolve
    pub async fn process(&self, references: &[String]) -> Vec<Record> {
        let progress = if self.show_progress {
            let bar = ProgressBar::new(references.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(style);
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut records = Vec::with_capacity(references.len());

        for reference in references {
            tracing::info!("Processing URL: {}", reference);
            progress.set_message(reference.clone());

            match self.build(reference).await {
                Some(record) => records.push(record),
                None => tracing::debug!("Skipping URL with unresolvable video id: {}", reference),
            }

            progress.inc(1);
        }

        progress.finish_with_message(format!("{} record(s) built", records.len()));
        tracing::info!(
            processed = references.len(),
            records = records.len(),
            "Finished processing references"
        );

        records
    }
}

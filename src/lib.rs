//! Video Transcript Scraper - A Rust CLI tool for collecting YouTube transcripts
//!
//! This library resolves video references (watch/short/embed/shorts URLs or raw ids),
//! gathers title, view count and transcript text for each video, and exports the
//! resulting records as JSON, CSV, XML, an HTML table or an RSS feed.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Settings;
pub use extractors::{MetadataService, TranscriptService, VideoId, VideoMetadata};
pub use output::{ExportFormat, ExportOptions};
pub use pipeline::{Record, ScrapePipeline};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Run-level errors of the scraper
#[derive(thiserror::Error, Debug)]
pub enum ScraperError {
    #[error("No references found in input file: {0}")]
    NoReferences(String),

    #[error("No records to export: every reference failed to resolve")]
    NoRecords,

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

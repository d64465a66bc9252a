use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::pipeline::Record;
use crate::{Result, ScraperError};

pub mod formatters;

pub use formatters::*;

/// Supported export encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
    Html,
    Rss,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::Xml,
        ExportFormat::Html,
        ExportFormat::Rss,
    ];

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
            ExportFormat::Html => "html",
            ExportFormat::Rss => "rss",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Json => "Pretty-printed array of records",
            ExportFormat::Csv => "Header row plus one row per record",
            ExportFormat::Xml => "Root element with one child element per record",
            ExportFormat::Html => "Self-contained HTML page with a table",
            ExportFormat::Rss => "RSS 2.0 feed with one item per record",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScraperError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "xml" => Ok(ExportFormat::Xml),
            "html" | "html_table" => Ok(ExportFormat::Html),
            "rss" => Ok(ExportFormat::Rss),
            _ => Err(ScraperError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.extension())
    }
}

/// Caller-supplied labels for the HTML, XML and RSS encodings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Page title and heading of the HTML table
    pub html_title: String,

    /// RSS channel title
    pub channel_title: String,

    /// RSS channel link
    pub channel_link: String,

    /// RSS channel description
    pub channel_description: String,

    /// XML root element name
    pub xml_root_tag: String,

    /// XML element name for each record
    pub xml_item_tag: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            html_title: "YouTube Transcript Export".to_string(),
            channel_title: "YouTube Transcript Export".to_string(),
            channel_link: "https://www.youtube.com".to_string(),
            channel_description: "Transcripts scraped from YouTube videos.".to_string(),
            xml_root_tag: "videos".to_string(),
            xml_item_tag: "video".to_string(),
        }
    }
}

/// Distinct field names across all records, in first-seen order
pub fn field_union(records: &[Record]) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = Vec::new();
    for record in records {
        for &name in record.field_names() {
            if !fields.contains(&name) {
                fields.push(name);
            }
        }
    }
    fields
}

/// Render records in one format
pub fn render(records: &[Record], format: ExportFormat, options: &ExportOptions) -> Result<String> {
    let now = Utc::now();
    match format {
        ExportFormat::Json => format_as_json(records),
        ExportFormat::Csv => format_as_csv(records),
        ExportFormat::Xml => format_as_xml(records, &options.xml_root_tag, &options.xml_item_tag),
        ExportFormat::Html => Ok(format_as_html(records, &options.html_title, now)),
        ExportFormat::Rss => format_as_rss(records, options, now),
    }
}

/// Write records to `path` in one format, creating the parent directory if needed
pub fn export(
    records: &[Record],
    path: &Path,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }

    let content = render(records, format, options)
        .with_context(|| format!("Failed to render {} export", format))?;

    fs_err::write(path, content)?;
    tracing::info!(format = %format, path = %path.display(), "Export complete");

    Ok(())
}

/// Destination of one export: `<output_dir>/<base_name>.<ext>`
pub fn output_path(output_dir: &Path, base_name: &str, format: ExportFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", base_name, format.extension()))
}

/// Export the same records once per requested format
///
/// Unknown format names are logged and skipped. Returns the files written.
pub fn export_results(
    records: &[Record],
    output_dir: &Path,
    base_name: &str,
    formats: &[String],
    options: &ExportOptions,
) -> Result<Vec<PathBuf>> {
    fs_err::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for name in formats {
        let format = match name.parse::<ExportFormat>() {
            Ok(format) => format,
            Err(err) => {
                tracing::error!("{}, skipping", err);
                continue;
            }
        };

        let path = output_path(output_dir, base_name, format);
        export(records, &path, format, options)?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> Record {
        Record {
            title: Some(title.to_string()),
            views: None,
            target_url: format!("https://youtu.be/{}", title),
            transcript: None,
        }
    }

    #[test]
    fn test_format_names() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("html_table".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!(" rss ".parse::<ExportFormat>().unwrap(), ExportFormat::Rss);
        assert!(matches!(
            "yaml".parse::<ExportFormat>(),
            Err(ScraperError::UnknownFormat(name)) if name == "yaml"
        ));
    }

    #[test]
    fn test_field_union() {
        assert!(field_union(&[]).is_empty());
        assert_eq!(
            field_union(&[record("a"), record("b")]),
            vec!["title", "views", "target_url", "transcript"]
        );
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("out"), "videos", ExportFormat::Rss),
            Path::new("out").join("videos.rss")
        );
    }

    #[test]
    fn test_export_results_skips_unknown_formats() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("exports");
        let formats = vec!["json".to_string(), "pdf".to_string(), "CSV".to_string()];

        let written = export_results(
            &[record("a")],
            &out,
            "batch",
            &formats,
            &ExportOptions::default(),
        )
        .unwrap();

        assert_eq!(written, vec![out.join("batch.json"), out.join("batch.csv")]);
        assert!(out.join("batch.json").exists());
        assert!(!out.join("batch.pdf").exists());
    }
}

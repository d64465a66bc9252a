use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use video_transcript_scraper::extractors::{
    TranscriptError, TranscriptSegment, TranscriptService, VideoDetails,
};
use video_transcript_scraper::output::{export_results, field_union, ExportOptions};
use video_transcript_scraper::{MetadataService, Record, ScrapePipeline};

/// Metadata fake keyed by reference; unknown references fail
struct FakeMetadata {
    known: HashMap<String, VideoDetails>,
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl MetadataService for FakeMetadata {
    async fn video_details(&self, url: &str) -> anyhow::Result<VideoDetails> {
        self.calls.lock().unwrap().push(url.to_string());
        self.known
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("video unavailable"))
    }
}

/// Transcript fake keyed by video id; unknown ids have transcripts disabled
struct FakeTranscripts {
    known: HashMap<String, Vec<&'static str>>,
}

#[async_trait]
impl TranscriptService for FakeTranscripts {
    async fn transcript(
        &self,
        video_id: &str,
        _languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, TranscriptError> {
        match self.known.get(video_id) {
            Some(texts) => Ok(texts.iter().map(|t| TranscriptSegment::new(*t)).collect()),
            None => Err(TranscriptError::Disabled {
                video_id: video_id.to_string(),
            }),
        }
    }
}

fn pipeline() -> (ScrapePipeline, Arc<FakeMetadata>) {
    let metadata = Arc::new(FakeMetadata {
        known: HashMap::from([(
            "https://youtu.be/dQw4w9WgXcQ".to_string(),
            VideoDetails {
                title: Some("Rick Astley – Never Gonna Give You Up".to_string()),
                views: Some(1_500_000_000),
            },
        )]),
        calls: Mutex::new(Vec::new()),
    });
    let transcripts = Arc::new(FakeTranscripts {
        known: HashMap::from([("dQw4w9WgXcQ".to_string(), vec![" We're no ", "", "strangers"])]),
    });

    (
        ScrapePipeline::new(metadata.clone(), transcripts, Vec::new()),
        metadata,
    )
}

#[tokio::test]
async fn mixed_references_produce_uniform_records() {
    let (pipeline, metadata) = pipeline();
    let references = vec![
        "dQw4w9WgXcQ".to_string(),
        "https://youtu.be/dQw4w9WgXcQ".to_string(),
        "not a url".to_string(),
    ];

    let records = pipeline.process(&references).await;

    assert_eq!(records.len(), 2);
    assert_eq!(
        *metadata.calls.lock().unwrap(),
        vec!["dQw4w9WgXcQ", "https://youtu.be/dQw4w9WgXcQ"]
    );

    // raw id: metadata lookup failed, transcript still found
    assert_eq!(
        records[0],
        Record {
            title: None,
            views: None,
            target_url: "dQw4w9WgXcQ".to_string(),
            transcript: Some("We're no strangers".to_string()),
        }
    );
    assert_eq!(records[1].views.as_deref(), Some("1,500,000,000 views"));

    assert_eq!(field_union(&records), Record::FIELD_NAMES.to_vec());
}

#[tokio::test]
async fn exports_every_format_and_round_trips_json() {
    let (pipeline, _) = pipeline();
    let references = vec![
        "https://youtu.be/dQw4w9WgXcQ".to_string(),
        "https://www.youtube.com/watch?v=unknown0001".to_string(),
    ];
    let records = pipeline.process(&references).await;
    assert_eq!(records.len(), 2);

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("exports");
    let formats: Vec<String> = ["json", "csv", "xml", "html", "rss", "docx"]
        .iter()
        .map(|f| f.to_string())
        .collect();

    let written =
        export_results(&records, &out, "batch", &formats, &ExportOptions::default()).unwrap();
    assert_eq!(written.len(), 5);

    let json = std::fs::read_to_string(out.join("batch.json")).unwrap();
    assert!(json.contains("Rick Astley – Never Gonna Give You Up"));
    let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, records);

    let csv = std::fs::read_to_string(out.join("batch.csv")).unwrap();
    assert!(csv.starts_with("title,views,target_url,transcript\n"));
    assert!(csv.contains("\"1,500,000,000 views\""));

    let xml = std::fs::read_to_string(out.join("batch.xml")).unwrap();
    assert_eq!(xml.matches("<video>").count(), 2);
    assert!(xml.contains("<title/>"));

    let html = std::fs::read_to_string(out.join("batch.html")).unwrap();
    assert!(html.contains("<td>We&apos;re no strangers</td>"));
    assert!(!html.contains("&#x27;"));

    let rss = std::fs::read_to_string(out.join("batch.rss")).unwrap();
    assert_eq!(rss.matches("<item>").count(), 2);
    assert!(rss.contains("<title>Untitled video</title>"));
    assert!(rss.contains("<guid>https://www.youtube.com/watch?v=unknown0001</guid>"));

    assert!(!out.join("batch.docx").exists());
}

#[test]
fn zero_records_still_produce_valid_files() {
    let dir = TempDir::new().unwrap();
    let formats: Vec<String> = ["json", "csv", "xml", "html", "rss"]
        .iter()
        .map(|f| f.to_string())
        .collect();

    export_results(&[], dir.path(), "empty", &formats, &ExportOptions::default()).unwrap();

    let json = std::fs::read_to_string(dir.path().join("empty.json")).unwrap();
    let parsed: Vec<Record> = serde_json::from_str(&json).unwrap();
    assert!(parsed.is_empty());

    let csv = std::fs::read_to_string(dir.path().join("empty.csv")).unwrap();
    assert_eq!(csv.lines().count(), 1);

    let xml = std::fs::read_to_string(dir.path().join("empty.xml")).unwrap();
    assert!(xml.contains("<videos>") && !xml.contains("<video>"));

    let html = std::fs::read_to_string(dir.path().join("empty.html")).unwrap();
    assert!(html.contains("No data to display."));

    let rss = std::fs::read_to_string(dir.path().join("empty.rss")).unwrap();
    assert!(rss.contains("<channel>") && !rss.contains("<item>"));
}

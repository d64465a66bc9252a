use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};

use super::{
    parse_video_id, MetadataService, TranscriptError, TranscriptSegment, TranscriptService,
    VideoDetails,
};
use crate::Result;

/// Languages tried when the caller has no preference
const DEFAULT_LANGUAGES: &[&str] = &["en"];

/// Caption rendition with per-event text segments
const CAPTION_FORMAT: &str = "json3";

/// Info documents kept per video; both lookups for a reference hit the same entry
const INFO_CACHE_CAPACITY: usize = 4;

type InfoSlot = Arc<OnceCell<Value>>;

/// Thin wrapper around the `yt-dlp` executable
///
/// Clones share one small cache of recent info documents, keyed by video id.
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: String,
    recent: Arc<Mutex<VecDeque<(String, InfoSlot)>>>,
}

impl YtDlp {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            recent: Arc::new(Mutex::new(VecDeque::with_capacity(INFO_CACHE_CAPACITY))),
        }
    }

    /// Info document for a video id, dumping it at most once while it stays cached
    ///
    /// Concurrent callers for the same id wait on a single yt-dlp run. A failed run is
    /// not cached.
    pub async fn video_info(&self, video_id: &str) -> Result<Value> {
        let url = watch_url(video_id);
        let slot = self.slot(video_id).await;
        let info = slot.get_or_try_init(|| self.dump_json(&url)).await?;
        Ok(info.clone())
    }

    async fn slot(&self, video_id: &str) -> InfoSlot {
        let mut recent = self.recent.lock().await;
        if let Some((_, slot)) = recent.iter().find(|(id, _)| id == video_id) {
            return slot.clone();
        }

        if recent.len() >= INFO_CACHE_CAPACITY {
            recent.pop_front();
        }
        let slot = InfoSlot::default();
        recent.push_back((video_id.to_string(), slot.clone()));
        slot
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Get video information as the JSON document yt-dlp dumps
    pub async fn dump_json(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.path)
            .args(["--dump-json", "--skip-download", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str).context("yt-dlp printed invalid JSON")?;

        Ok(info)
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Title and view count straight from the yt-dlp dump
pub fn details_from_info(info: &Value) -> VideoDetails {
    VideoDetails {
        title: info["title"].as_str().map(str::to_string),
        views: info["view_count"].as_u64(),
    }
}

/// Metadata service backed by yt-dlp
pub struct YoutubeMetadataService {
    yt_dlp: YtDlp,
}

impl YoutubeMetadataService {
    pub fn new(yt_dlp: YtDlp) -> Self {
        Self { yt_dlp }
    }
}

#[async_trait]
impl MetadataService for YoutubeMetadataService {
    async fn video_details(&self, url: &str) -> Result<VideoDetails> {
        let info = match parse_video_id(url) {
            Ok(video_id) => self.yt_dlp.video_info(video_id.as_str()).await?,
            Err(_) => self.yt_dlp.dump_json(url).await?,
        };
        Ok(details_from_info(&info))
    }
}

/// One downloadable rendition of a caption track
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionRendition {
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub url: String,
}

/// Caption tracks keyed by language code
pub type CaptionTracks = BTreeMap<String, Vec<CaptionRendition>>;

/// Manual and auto-generated caption tracks of one video
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionCatalog {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subtitles: CaptionTracks,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub automatic_captions: CaptionTracks,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<CaptionTracks, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<CaptionTracks>::deserialize(deserializer)?.unwrap_or_default())
}

impl CaptionCatalog {
    pub fn from_info(info: &Value) -> Result<Self> {
        Ok(serde_json::from_value(info.clone())?)
    }

    pub fn is_empty(&self) -> bool {
        self.subtitles.is_empty() && self.automatic_captions.is_empty()
    }

    /// Every language with at least one track, manual first
    pub fn available_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.subtitles.keys().cloned().collect();
        for language in self.automatic_captions.keys() {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }
        languages
    }

    /// Pick the first requested language that has a track, preferring manual tracks
    pub fn select<'a>(&'a self, languages: &[String]) -> Option<(&'a str, &'a [CaptionRendition])> {
        languages.iter().find_map(|language| {
            self.subtitles
                .get_key_value(language)
                .or_else(|| self.automatic_captions.get_key_value(language))
                .map(|(code, renditions)| (code.as_str(), renditions.as_slice()))
        })
    }
}

#[derive(Debug, Deserialize)]
struct Json3Transcript {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Turn a json3 caption document into transcript segments, one per timed event
pub fn parse_json3(body: &str) -> Result<Vec<TranscriptSegment>> {
    let document: Json3Transcript =
        serde_json::from_str(body).context("Failed to parse json3 captions")?;

    let segments = document
        .events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            Some(TranscriptSegment {
                text: segs.into_iter().map(|seg| seg.utf8).collect(),
                start: event.start_ms as f64 / 1000.0,
                duration: event.duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(segments)
}

/// Transcript service that reads caption tracks listed by yt-dlp
pub struct YoutubeTranscriptService {
    yt_dlp: YtDlp,
    client: Client,
}

impl YoutubeTranscriptService {
    pub fn new(yt_dlp: YtDlp) -> Self {
        Self {
            yt_dlp,
            client: Client::new(),
        }
    }

    async fn download_captions(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download captions: HTTP {}", response.status());
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl TranscriptService for YoutubeTranscriptService {
    async fn transcript(
        &self,
        video_id: &str,
        languages: &[String],
    ) -> std::result::Result<Vec<TranscriptSegment>, TranscriptError> {
        let info = self.yt_dlp.video_info(video_id).await?;
        let catalog = CaptionCatalog::from_info(&info)?;

        if catalog.is_empty() {
            return Err(TranscriptError::Disabled {
                video_id: video_id.to_string(),
            });
        }

        let requested: Vec<String> = if languages.is_empty() {
            DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect()
        } else {
            languages.to_vec()
        };

        let (language, renditions) =
            catalog
                .select(&requested)
                .ok_or_else(|| TranscriptError::NotFound {
                    video_id: video_id.to_string(),
                    requested: requested.clone(),
                    available: catalog.available_languages(),
                })?;

        let rendition = renditions
            .iter()
            .find(|r| r.ext == CAPTION_FORMAT)
            .ok_or_else(|| {
                anyhow::anyhow!("No {} captions for language '{}'", CAPTION_FORMAT, language)
            })?;

        tracing::debug!(video_id, language, "Downloading captions");
        let body = self.download_captions(&rendition.url).await?;

        Ok(parse_json3(&body)?)
    }
}

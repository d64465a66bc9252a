use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use crate::output::ExportOptions;

/// Name of the per-user settings directory
const APP_DIR: &str = "transcript-scraper";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,

    /// JSON file listing the video references
    pub input_file: PathBuf,

    /// Directory receiving the exports
    pub output_dir: PathBuf,

    /// File name (without extension) of every export
    pub output_base_name: String,

    /// Formats to export, a single name or a list
    #[serde(deserialize_with = "one_or_many")]
    pub output_formats: Vec<String>,

    /// Preferred transcript languages, tried in order
    #[serde(deserialize_with = "one_or_many")]
    pub transcript_languages: Vec<String>,

    /// Path to the yt-dlp executable
    pub yt_dlp_path: String,

    /// Labels for the HTML, XML and RSS exports
    pub export: ExportOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            input_file: PathBuf::from("data/input_urls.sample.json"),
            output_dir: PathBuf::from("data"),
            output_base_name: "youtube_transcripts".to_string(),
            output_formats: vec!["json".to_string()],
            transcript_languages: Vec::new(),
            yt_dlp_path: "yt-dlp".to_string(),
            export: ExportOptions::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
        None => Vec::new(),
    })
}

impl Settings {
    /// Load settings from an explicit file, the first discovered file, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            return Self::from_file(path);
        }

        match Self::discover() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a settings file; `.json` files as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let settings = if is_json(path) {
            serde_json::from_str(&content).context("Failed to parse config file")?
        } else {
            serde_yaml::from_str(&content).context("Failed to parse config file")?
        };

        Ok(settings)
    }

    /// Save settings to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = if is_json(path) {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        } else {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        };

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Candidate settings files, in lookup order
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from("settings.yaml"), PathBuf::from("settings.json")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(APP_DIR).join("settings.yaml"));
        }
        candidates
    }

    /// First existing settings file
    pub fn discover() -> Option<PathBuf> {
        Self::candidate_paths().into_iter().find(|path| path.exists())
    }

    /// Where `config --init` writes: the discovered file, else the per-user location
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = Self::discover() {
            return Ok(path);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join(APP_DIR).join("settings.yaml"))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Log Level: {}", self.log_level);
        println!("  Input File: {}", self.input_file.display());
        println!("  Output Dir: {}", self.output_dir.display());
        println!("  Output Base Name: {}", self.output_base_name);
        println!("  Output Formats: {}", self.output_formats.join(", "));
        if self.transcript_languages.is_empty() {
            println!("  Transcript Languages: (service default)");
        } else {
            println!("  Transcript Languages: {}", self.transcript_languages.join(", "));
        }
        println!("  yt-dlp: {}", self.yt_dlp_path);
        println!("  XML Tags: <{}>/<{}>", self.export.xml_root_tag, self.export.xml_item_tag);
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

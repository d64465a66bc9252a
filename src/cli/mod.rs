use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "transcript-scraper",
    about = "Video Transcript Scraper - Collect YouTube titles, view counts and transcripts",
    version,
    long_about = "A CLI tool that resolves YouTube references (watch, short, embed and shorts URLs or raw ids), fetches each video's title, view count and transcript, and exports the records as JSON, CSV, XML, an HTML table or an RSS feed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch metadata and transcripts for every reference in the input file and export them
    Scrape {
        /// Path to a settings file (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the input JSON file with video references
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Override output formats (json, csv, xml, html, rss)
        #[arg(short, long, value_name = "FORMAT", num_args = 1..)]
        formats: Option<Vec<String>>,

        /// Override output directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Process only the first N references from the input file
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,

        /// Preferred transcript languages, tried in order
        #[arg(long, value_name = "LANG", num_args = 1..)]
        languages: Option<Vec<String>>,
    },

    /// Show the video id each reference resolves to
    Resolve {
        /// Video URLs or raw ids
        #[arg(value_name = "REFERENCE", required = true)]
        references: Vec<String>,
    },

    /// List supported export formats
    Formats,

    /// Show or initialise settings
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write the default settings file
        #[arg(long, conflicts_with = "show")]
        init: bool,

        /// Path to a settings file (JSON or YAML)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_transcript_scraper::extractors::youtube::{
    YoutubeMetadataService, YoutubeTranscriptService, YtDlp,
};
use video_transcript_scraper::extractors::{parse_video_id, ResolveError};
use video_transcript_scraper::input::load_input_urls;
use video_transcript_scraper::output::{export_results, ExportFormat};
use video_transcript_scraper::{utils, Cli, Commands, ScrapePipeline, ScraperError, Settings};

/// Overrides for a scrape run taken from the command line
struct ScrapeArgs {
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    formats: Option<Vec<String>>,
    output_dir: Option<PathBuf>,
    limit: Option<usize>,
    languages: Option<Vec<String>>,
}

fn init_tracing(level: &str, verbose: bool) {
    let level = if verbose { "debug".to_string() } else { level.to_lowercase() };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("video_transcript_scraper={0},transcript_scraper={0}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape {
            config,
            input,
            formats,
            output_dir,
            limit,
            languages,
        } => {
            let args = ScrapeArgs {
                config,
                input,
                formats,
                output_dir,
                limit,
                languages,
            };
            scrape(args, cli.verbose, cli.quiet).await?;
        }
        Commands::Resolve { references } => {
            init_tracing("warn", cli.verbose);
            let mut failures = 0;
            for reference in &references {
                match parse_video_id(reference) {
                    Ok(id) => println!("{} -> {}", reference, style(id).green()),
                    Err(err) => {
                        failures += 1;
                        println!("{} -> {}", reference, style(describe(&err)).red());
                    }
                }
            }
            if failures == references.len() {
                anyhow::bail!("None of the references could be resolved");
            }
        }
        Commands::Formats => {
            println!("Supported export formats:");
            for format in ExportFormat::ALL {
                println!(
                    "  • {} .{:<5} {}",
                    style(format!("{:<5}", format)).bold(),
                    format.extension(),
                    format.description()
                );
            }
        }
        Commands::Config { show, init, config } => {
            if init {
                let path = match config {
                    Some(path) => path,
                    None => Settings::default_path()?,
                };
                if path.exists() {
                    println!("Settings already exist at: {}", path.display());
                } else {
                    Settings::default().save(&path)?;
                    println!("Default settings written to: {}", path.display());
                }
            } else {
                let settings = Settings::load(config.as_deref())?;
                if show {
                    settings.display();
                } else {
                    println!("Settings are read from the first existing file of:");
                    for candidate in Settings::candidate_paths() {
                        println!("  {}", candidate.display());
                    }
                    println!("Run `transcript-scraper config --init` to create one.");
                }
            }
        }
    }

    Ok(())
}

async fn scrape(args: ScrapeArgs, verbose: bool, quiet: bool) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    init_tracing(&settings.log_level, verbose);

    let yt_dlp = YtDlp::new(settings.yt_dlp_path.clone());

    // Check for required external dependencies (non-fatal)
    let missing_deps = utils::check_dependencies(&yt_dlp).await;
    for dep in missing_deps {
        tracing::warn!("Missing dependency: {}", dep);
    }

    let input_path = args.input.unwrap_or_else(|| settings.input_file.clone());
    let output_dir = args.output_dir.unwrap_or_else(|| settings.output_dir.clone());
    let formats = args.formats.unwrap_or_else(|| settings.output_formats.clone());
    let languages = args
        .languages
        .unwrap_or_else(|| settings.transcript_languages.clone());

    let mut references = load_input_urls(&input_path)?;
    if let Some(limit) = args.limit.filter(|limit| *limit > 0) {
        references.truncate(limit);
    }

    if references.is_empty() {
        tracing::error!("No URLs found in input file {}", input_path.display());
        return Err(ScraperError::NoReferences(input_path.display().to_string()).into());
    }

    tracing::info!("Loaded {} URL(s) from {}", references.len(), input_path.display());

    let pipeline = ScrapePipeline::new(
        Arc::new(YoutubeMetadataService::new(yt_dlp.clone())),
        Arc::new(YoutubeTranscriptService::new(yt_dlp)),
        languages,
    )
    .with_progress(!quiet);

    let records = pipeline.process(&references).await;

    if records.is_empty() {
        tracing::error!("No records to export - scraping produced no results.");
        return Err(ScraperError::NoRecords.into());
    }

    let written = export_results(
        &records,
        &output_dir,
        &settings.output_base_name,
        &formats,
        &settings.export,
    )?;

    for path in &written {
        println!("Export saved to: {}", path.display());
    }
    tracing::info!("Done. Exported {} record(s).", records.len());

    Ok(())
}

fn describe(err: &ResolveError) -> String {
    match err {
        ResolveError::InvalidUrl { .. } => "not a video id or URL".to_string(),
        ResolveError::EmptyShortLink { .. } => "short link without video id".to_string(),
        ResolveError::NoVideoId { .. } => "no video id in URL".to_string(),
        ResolveError::UnsupportedHost { host, .. } => format!("unsupported host '{}'", host),
    }
}

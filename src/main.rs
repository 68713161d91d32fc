// Takeout Embed CLI binary

use std::path::PathBuf;
use clap::Parser;
use anyhow::Result;

mod constants;
mod embed;
mod error;
mod flatten;
mod manifest;
mod pairing;
mod tags;
mod timestamp;
mod tools;

use embed::exiftool::{ExifToolDates, ExifToolWriter};
use embed::ffmpeg::FfmpegTranscoder;
use embed::Capabilities;

#[derive(Parser)]
#[command(name = "takeout-embed")]
#[command(about = "Embed photo-export sidecar metadata into media files and build an asset manifest", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing media files and JSON metadata sidecars
    directory: PathBuf,

    /// Increase verbosity (-v=DEBUG, -vv=TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if !cli.directory.is_dir() {
        log::error!("{} is not a valid directory", cli.directory.display());
        std::process::exit(1);
    }

    let report = pairing::resolve_pairs(&cli.directory)?;

    if !report.unmatched.is_empty() {
        log::warn!("The following media files do not have corresponding metadata:");
        for path in &report.unmatched {
            log::warn!("No metadata: {}", file_name(path));
        }
    }

    if report.pairs.is_empty() {
        log::warn!("No media/sidecar pairs found.");
        return Ok(());
    }

    log::info!("Found {} media/sidecar pairs. Ready to embed metadata.", report.pairs.len());
    for pair in &report.pairs {
        log::info!("Media: {} <-> JSON: {}", file_name(&pair.media.path), file_name(&pair.sidecar));
    }

    if !embed::exiftool::is_available() {
        log::warn!("exiftool not found; tag embedding and date updates will fail");
    }
    if !embed::ffmpeg::is_available() {
        log::warn!("ffmpeg not found; video transcodes will fail");
    }
    #[cfg(target_os = "macos")]
    if !tools::is_tool_available("SetFile") {
        log::warn!("SetFile not found; Finder date updates will be skipped");
    }

    let tag_writer = ExifToolWriter;
    let transcoder = FfmpegTranscoder;
    let dates = ExifToolDates;
    let caps = Capabilities {
        tag_writer: &tag_writer,
        transcoder: &transcoder,
        date_reader: &dates,
        date_writer: &dates,
    };

    let stats = embed::process_pairs(&report.pairs, &caps);

    embed::normalize_creation_dates(&cli.directory, &dates);

    let manifest_path = manifest::write_manifest(&cli.directory)?;

    println!();
    println!("Embed complete:");
    println!("  Pairs:      {}", report.pairs.len());
    println!("  Processed:  {}", stats.processed);
    println!("  Failed:     {}", stats.failed);
    println!("  Unmatched:  {}", report.unmatched.len());
    println!("  Manifest:   {}", manifest_path.display());

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

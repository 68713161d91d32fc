// Embedding dispatcher
//
// External tools are reached only through the capability traits below, so
// the per-pair orchestration is testable with fakes. One pair's failure
// never aborts the batch.

pub mod exiftool;
pub mod ffmpeg;

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::WITHMETA_MARKER;
use crate::error::Result;
use crate::flatten::{flatten, FlatMetadata};
use crate::pairing::{MediaFile, MediaKind, Pair};
use crate::tags::{map_tags, TagMapping};
use crate::timestamp::{best_timestamp, container_date, exif_date, finder_date};

/// Container-level fields attached during a video transcode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscodeFields {
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DDTHH:MM:SS`, absent when the sidecar carries no timestamp
    pub creation_time: Option<String>,
}

/// Writes a tag mapping into a media file in place (no backup retained).
pub trait TagWriter {
    fn write_tags(&self, path: &Path, tags: &TagMapping) -> Result<()>;
}

/// Copies a video's streams into a new container with attached metadata.
pub trait Transcoder {
    fn transcode(&self, input: &Path, output: &Path, fields: &TranscodeFields) -> Result<()>;
}

/// Reads the OS-level creation date of a file, `YYYY:MM:DD HH:MM:SS`.
pub trait FileDateReader {
    fn creation_date(&self, path: &Path) -> Result<Option<String>>;
}

/// Mutates OS-level file dates.
pub trait FileDateWriter {
    /// Set the filesystem creation date, `YYYY:MM:DD HH:MM:SS`.
    fn set_creation_date(&self, path: &Path, date: &str) -> Result<()>;

    /// Set the Finder/extended creation-date attribute, `MM/DD/YYYY HH:MM:SS`.
    fn set_finder_date(&self, path: &Path, date: &str) -> Result<()>;

    /// Copy the embedded capture date onto the filesystem creation date.
    /// Returns whether a capture tag was present.
    fn sync_creation_date_from_capture(&self, path: &Path) -> Result<bool>;
}

/// The external-tool surface handed to the dispatcher
pub struct Capabilities<'a> {
    pub tag_writer: &'a dyn TagWriter,
    pub transcoder: &'a dyn Transcoder,
    pub date_reader: &'a dyn FileDateReader,
    pub date_writer: &'a dyn FileDateWriter,
}

/// Per-batch outcome counters
#[derive(Debug, Default)]
pub struct EmbedStats {
    pub processed: usize,
    pub failed: usize,
}

/// Derived output path for a video transcode: `_withmeta` inserted before
/// the extension, and `.mov` inputs normalized to `.mp4` (container
/// metadata support in `.mov` is unreliable).
pub fn transcode_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let out_ext = if ext.eq_ignore_ascii_case("mov") { "mp4" } else { ext };
    let file_name = format!("{}{}.{}", stem, WITHMETA_MARKER, out_ext);

    match input.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Process every pair, logging and skipping failures.
pub fn process_pairs(pairs: &[Pair], caps: &Capabilities) -> EmbedStats {
    let mut stats = EmbedStats::default();
    for pair in pairs {
        log::info!(
            "Processing {} with metadata {}",
            pair.media.path.display(),
            pair.sidecar.display()
        );
        match process_pair(pair, caps) {
            Ok(()) => stats.processed += 1,
            Err(e) => {
                log::error!("Failed to embed metadata for {}: {}", pair.media.path.display(), e);
                stats.failed += 1;
            }
        }
    }
    stats
}

/// Align every image's filesystem creation date with its embedded capture
/// date, falling back to a fixed default when no capture tag exists. Runs
/// over the whole directory so images without sidecars are covered too.
pub fn normalize_creation_dates(dir: &Path, date_writer: &dyn FileDateWriter) {
    for name in crate::pairing::list_file_names(dir) {
        let is_image = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| crate::constants::IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let path = dir.join(&name);
        let result = date_writer
            .sync_creation_date_from_capture(&path)
            .and_then(|synced| {
                if synced {
                    log::info!("Set creation date from capture tag for {}", name);
                    Ok(())
                } else {
                    log::info!("Set default creation date for {}", name);
                    date_writer.set_creation_date(&path, crate::constants::DEFAULT_CREATE_DATE)
                }
            });
        if let Err(e) = result {
            log::error!("Failed to normalize creation date for {}: {}", path.display(), e);
        }
    }
}

fn process_pair(pair: &Pair, caps: &Capabilities) -> Result<()> {
    let raw = fs::read_to_string(&pair.sidecar)?;
    let doc: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        crate::error::TakeoutEmbedError::MalformedMetadata(format!(
            "{}: {}",
            pair.sidecar.display(),
            e
        ))
    })?;
    let flat = flatten(&doc)?;
    let epoch = best_timestamp(&flat);

    match pair.media.kind {
        MediaKind::Image => embed_image(&pair.media, &flat, epoch, caps),
        MediaKind::Video => embed_video(&pair.media, &flat, epoch, caps),
    }
}

fn embed_image(
    media: &MediaFile,
    flat: &FlatMetadata,
    epoch: Option<i64>,
    caps: &Capabilities,
) -> Result<()> {
    let tags = map_tags(flat, MediaKind::Image);
    caps.tag_writer.write_tags(&media.path, &tags)?;

    if let Some(epoch) = epoch {
        if let Some(date) = exif_date(epoch) {
            caps.date_writer.set_creation_date(&media.path, &date)?;
        }
        // The tag-embedding tool does not reliably carry creation date into
        // PNG containers; set the Finder attribute as well.
        if media.extension == "png" {
            if let Some(date) = finder_date(epoch) {
                caps.date_writer.set_finder_date(&media.path, &date)?;
            }
        }
    }

    Ok(())
}

fn embed_video(
    media: &MediaFile,
    flat: &FlatMetadata,
    epoch: Option<i64>,
    caps: &Capabilities,
) -> Result<()> {
    let fields = TranscodeFields {
        title: string_field(flat, "title"),
        description: string_field(flat, "description"),
        creation_time: epoch.and_then(container_date),
    };

    let output = transcode_output_path(&media.path);
    caps.transcoder.transcode(&media.path, &output, &fields)?;
    log::info!("Created video with embedded metadata: {}", output.display());

    // Carry the original's provenance across the container change
    if let Some(date) = caps.date_reader.creation_date(&media.path)? {
        caps.date_writer.set_creation_date(&output, &date)?;
    }
    propagate_mtime(&media.path, &output);

    Ok(())
}

fn string_field(flat: &FlatMetadata, key: &str) -> String {
    match flat.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Preserve the input's modification time on the transcode output.
fn propagate_mtime(source: &Path, dest: &Path) {
    if let Ok(meta) = fs::metadata(source) {
        if let Ok(modified) = meta.modified() {
            let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(modified));
        }
    }
}

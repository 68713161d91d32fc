// Media/sidecar pairing for a processed directory

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::constants::{IMAGE_EXTENSIONS, SIDECAR_SUFFIXES, VIDEO_EXTENSIONS};
use crate::error::{Result, TakeoutEmbedError};

/// Kind of a supported media file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// A discovered media file
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
    /// Lowercased extension without the dot
    pub extension: String,
}

/// A media file matched to its metadata sidecar
#[derive(Debug, Clone)]
pub struct Pair {
    pub media: MediaFile,
    pub sidecar: PathBuf,
}

/// Result of scanning a directory for media/sidecar pairs
#[derive(Debug, Default)]
pub struct PairingReport {
    pub pairs: Vec<Pair>,
    /// Media files with no sidecar by either the direct or the
    /// cross-reference path. Informational, not an error.
    pub unmatched: Vec<PathBuf>,
}

/// Classify an extension into a media kind
pub fn kind_for_extension(ext: &str) -> Option<MediaKind> {
    let ext = ext.to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// The grouping key for a filename: everything before the first `.`.
pub fn base_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Scan a directory (non-recursive) and match every supported media file to
/// a metadata sidecar. Direct matches dominate; a video without its own
/// sidecar may borrow a same-base-name image's sidecar.
pub fn resolve_pairs(dir: &Path) -> Result<PairingReport> {
    if !dir.is_dir() {
        return Err(TakeoutEmbedError::InvalidPath(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let names = list_file_names(dir);
    let present: BTreeSet<&str> = names.iter().map(String::as_str).collect();

    let mut report = PairingReport::default();
    for name in &names {
        let extension = match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_lowercase(),
            None => continue,
        };
        let kind = match kind_for_extension(&extension) {
            Some(k) => k,
            None => continue,
        };

        let media = MediaFile {
            path: dir.join(name),
            kind,
            extension,
        };

        match find_sidecar(name, kind, &present) {
            Some(sidecar_name) => report.pairs.push(Pair {
                media,
                sidecar: dir.join(sidecar_name),
            }),
            None => report.unmatched.push(media.path),
        }
    }

    Ok(report)
}

/// List plain file names in a directory, sorted for deterministic iteration.
pub fn list_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .collect();
    names.sort();
    names
}

/// Resolve the sidecar filename for a media file, if any.
fn find_sidecar(file_name: &str, kind: MediaKind, present: &BTreeSet<&str>) -> Option<String> {
    // Direct match against both naming conventions
    for suffix in SIDECAR_SUFFIXES {
        let candidate = format!("{}.{}", file_name, suffix);
        if present.contains(candidate.as_str()) {
            return Some(candidate);
        }
    }

    // Videos may borrow a sibling image's sidecar
    if kind == MediaKind::Video {
        let base = base_name(file_name);
        for image_ext in IMAGE_EXTENSIONS {
            let image_name = format!("{}.{}", base, image_ext);
            for suffix in SIDECAR_SUFFIXES {
                let candidate = format!("{}.{}", image_name, suffix);
                if present.contains(candidate.as_str()) {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

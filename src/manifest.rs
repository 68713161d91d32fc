// Asset manifest: groups directory entries into logical-asset rows and
// serializes them as manifest.csv inside the processed directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::constants::{
    IMAGE_EXTENSIONS, MANIFEST_COLUMNS, MANIFEST_FILENAME, SIDECAR_SUFFIXES, VIDEO_EXTENSIONS,
    WITHMETA_MARKER,
};
use crate::error::Result;
use crate::pairing::{base_name, list_file_names};

/// One logical asset: every slot holds at most one filename.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestRow {
    pub base_name: String,
    pub image: String,
    pub video: String,
    pub video_withmeta: String,
    pub metadata: String,
}

enum Slot {
    Image,
    Video,
    VideoWithMeta,
    Metadata,
}

/// Group a directory listing into manifest rows. Rows appear in
/// group-discovery order; within a group the last classified member wins
/// its slot. Entries that fit no slot contribute nothing.
pub fn build_manifest(names: &[String]) -> Vec<ManifestRow> {
    let mut rows: Vec<ManifestRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for name in names {
        if name == MANIFEST_FILENAME {
            continue;
        }
        let slot = match classify(name) {
            Some(s) => s,
            None => continue,
        };

        let base = derive_base_name(name);
        let row_idx = *index.entry(base.clone()).or_insert_with(|| {
            rows.push(ManifestRow { base_name: base.clone(), ..Default::default() });
            rows.len() - 1
        });

        let row = &mut rows[row_idx];
        match slot {
            Slot::Image => row.image = name.clone(),
            Slot::Video => row.video = name.clone(),
            Slot::VideoWithMeta => row.video_withmeta = name.clone(),
            Slot::Metadata => row.metadata = name.clone(),
        }
    }

    rows
}

/// Grouping key: text before the first `.`, trailing `_withmeta` stripped.
fn derive_base_name(name: &str) -> String {
    let base = base_name(name);
    base.strip_suffix(WITHMETA_MARKER).unwrap_or(base).to_string()
}

fn classify(name: &str) -> Option<Slot> {
    for suffix in SIDECAR_SUFFIXES {
        if name.ends_with(&format!(".{}", suffix)) {
            return Some(Slot::Metadata);
        }
    }

    let ext = Path::new(name).extension().and_then(|e| e.to_str())?.to_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(Slot::Image);
    }
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        if base_name(name).ends_with(WITHMETA_MARKER) {
            return Some(Slot::VideoWithMeta);
        }
        return Some(Slot::Video);
    }
    None
}

/// Build the manifest for a directory and write it as manifest.csv inside
/// that directory, overwriting any prior manifest.
pub fn write_manifest(dir: &Path) -> Result<PathBuf> {
    let names = list_file_names(dir);
    let rows = build_manifest(&names);

    let mut out = String::new();
    out.push_str(&MANIFEST_COLUMNS.join(","));
    out.push('\n');
    for row in &rows {
        let fields = [
            &row.base_name,
            &row.image,
            &row.video,
            &row.video_withmeta,
            &row.metadata,
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    let path = dir.join(MANIFEST_FILENAME);
    std::fs::write(&path, out)?;
    log::info!("Created manifest with {} rows: {}", rows.len(), path.display());
    Ok(path)
}

/// Quote a field only when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_image_with_sidecar_row() {
        let rows = build_manifest(&names(&["a.jpg", "a.jpg.supplemental-metadata.json"]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_name, "a");
        assert_eq!(rows[0].image, "a.jpg");
        assert_eq!(rows[0].metadata, "a.jpg.supplemental-metadata.json");
        assert!(rows[0].video.is_empty());
        assert!(rows[0].video_withmeta.is_empty());
    }

    #[test]
    fn test_video_group_includes_transcode_output() {
        let rows = build_manifest(&names(&[
            "b.jpg.supplemental-metadata.json",
            "b.mov",
            "b_withmeta.mp4",
        ]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_name, "b");
        assert_eq!(rows[0].video, "b.mov");
        assert_eq!(rows[0].video_withmeta, "b_withmeta.mp4");
        assert_eq!(rows[0].metadata, "b.jpg.supplemental-metadata.json");
    }

    #[test]
    fn test_unclassified_entries_make_no_rows() {
        let rows = build_manifest(&names(&["notes.txt", "loose.json", "manifest.csv"]));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rows_in_group_discovery_order() {
        let rows = build_manifest(&names(&["z.jpg", "a.mp4", "z.jpg.suppl.json"]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].base_name, "z");
        assert_eq!(rows[1].base_name, "a");
    }

    #[test]
    fn test_last_classified_member_wins_slot() {
        let rows = build_manifest(&names(&["a.jpeg", "a.jpg"]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].image, "a.jpg");
    }

    #[test]
    fn test_sidecar_row_kept_even_for_unparseable_json() {
        // Manifesting does not re-validate the sidecar's contents; the slot
        // is filled because the file exists and matches the suffix.
        let rows = build_manifest(&names(&["x.jpg", "x.jpg.suppl.json"]));
        assert_eq!(rows[0].metadata, "x.jpg.suppl.json");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain.jpg"), "plain.jpg");
        assert_eq!(csv_field("odd,name.jpg"), "\"odd,name.jpg\"");
        assert_eq!(csv_field("q\"uote"), "\"q\"\"uote\"");
    }

    #[test]
    fn test_write_manifest_overwrites() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.jpg"), b"img").unwrap();
        std::fs::write(tmp.path().join("a.jpg.suppl.json"), b"{}").unwrap();
        // Stale manifest from a prior run
        std::fs::write(tmp.path().join(MANIFEST_FILENAME), b"old").unwrap();

        let path = write_manifest(tmp.path()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "base_name,image,video,video_withmeta,metadata");
        assert_eq!(lines.next().unwrap(), "a,a.jpg,,,a.jpg.suppl.json");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_prior_manifest_not_grouped() {
        let rows = build_manifest(&names(&["manifest.csv", "a.jpg"]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_name, "a");
    }
}

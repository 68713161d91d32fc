// ExifTool-backed capabilities: in-place tag writing and OS-level
// creation-date access.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, TakeoutEmbedError};
use crate::tags::TagMapping;
use crate::tools;
use super::{FileDateReader, FileDateWriter, TagWriter};

/// Writes tags with `exiftool -TAG=VALUE ... -overwrite_original`.
pub struct ExifToolWriter;

impl TagWriter for ExifToolWriter {
    fn write_tags(&self, path: &Path, tags: &TagMapping) -> Result<()> {
        if tags.is_empty() {
            return Ok(());
        }

        let mut cmd = Command::new(tools::exiftool_path());
        for (tag, value) in tags {
            cmd.arg(format!("-{}={}", tag, value));
        }
        cmd.arg("-overwrite_original").arg(path);

        let output = cmd
            .output()
            .map_err(|e| TakeoutEmbedError::ExifTool(format!("Failed to run exiftool: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TakeoutEmbedError::ExifTool(format!(
                "exiftool failed for {}: {}",
                path.display(),
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Reads and writes filesystem creation dates through exiftool's
/// FileCreateDate pseudo-tag; Finder dates go through SetFile on macOS.
pub struct ExifToolDates;

impl FileDateReader for ExifToolDates {
    fn creation_date(&self, path: &Path) -> Result<Option<String>> {
        let output = Command::new(tools::exiftool_path())
            .args(["-j", "-FileCreateDate"])
            .arg(path)
            .output()
            .map_err(|e| TakeoutEmbedError::FileDate(format!("Failed to run exiftool: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TakeoutEmbedError::FileDate(format!(
                "exiftool failed for {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        let dump: serde_json::Value = serde_json::from_slice(&output.stdout)?;

        // exiftool returns an array of per-file objects; take the first
        let date = dump
            .as_array()
            .and_then(|a| a.first())
            .and_then(|o| o.get("FileCreateDate"))
            .and_then(|v| v.as_str())
            .map(String::from);

        Ok(date)
    }
}

impl FileDateWriter for ExifToolDates {
    fn set_creation_date(&self, path: &Path, date: &str) -> Result<()> {
        run_exiftool_update(path, &format!("-FileCreateDate={}", date))?;
        Ok(())
    }

    #[cfg(target_os = "macos")]
    fn set_finder_date(&self, path: &Path, date: &str) -> Result<()> {
        let output = Command::new(tools::setfile_path())
            .args(["-d", date])
            .arg(path)
            .output()
            .map_err(|e| TakeoutEmbedError::FileDate(format!("Failed to run SetFile: {}", e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TakeoutEmbedError::FileDate(format!(
                "SetFile failed for {}: {}",
                path.display(),
                stderr.trim()
            )));
        }
        Ok(())
    }

    #[cfg(not(target_os = "macos"))]
    fn set_finder_date(&self, path: &Path, _date: &str) -> Result<()> {
        log::debug!("No Finder date attribute on this platform, skipping {}", path.display());
        Ok(())
    }

    fn sync_creation_date_from_capture(&self, path: &Path) -> Result<bool> {
        let stdout = run_exiftool_update(path, "-FileCreateDate<DateTimeOriginal")?;
        // exiftool reports "1 image files updated" when the source tag existed
        Ok(stdout.contains("1 image files updated"))
    }
}

/// Run an `-overwrite_original` exiftool update and return its stdout.
fn run_exiftool_update(path: &Path, assignment: &str) -> Result<String> {
    let output = Command::new(tools::exiftool_path())
        .arg("-overwrite_original")
        .arg(assignment)
        .arg(path)
        .output()
        .map_err(|e| TakeoutEmbedError::FileDate(format!("Failed to run exiftool: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TakeoutEmbedError::FileDate(format!(
            "exiftool failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Check if exiftool is available
pub fn is_available() -> bool {
    tools::is_tool_available("exiftool")
}

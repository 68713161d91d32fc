// External tool resolver for exiftool/ffmpeg/SetFile
//
// Resolution order:
// 1) Environment variable override (TAKEOUT_EMBED_EXIFTOOL_PATH, etc.)
// 2) Sidecar binary next to the executable
// 3) PATH fallback

use std::env;
use std::path::PathBuf;

/// Get the directory containing the current executable
fn exe_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
}

/// Resolve a tool path.
fn resolve_tool(env_key: &str, default_name: &str) -> PathBuf {
    // 1) Check environment variable override
    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
    }

    // Add .exe on Windows
    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }

    // 2) Check sidecar next to executable
    if let Some(dir) = exe_dir() {
        let candidate = dir.join(&filename);
        if candidate.exists() {
            return candidate;
        }

        // Also check bin/ subdirectory (common bundling pattern)
        let bin_candidate = dir.join("bin").join(&filename);
        if bin_candidate.exists() {
            return bin_candidate;
        }
    }

    // 3) Fall back to PATH
    PathBuf::from(default_name)
}

/// Get path to exiftool binary
pub fn exiftool_path() -> PathBuf {
    resolve_tool("TAKEOUT_EMBED_EXIFTOOL_PATH", "exiftool")
}

/// Get path to ffmpeg binary
pub fn ffmpeg_path() -> PathBuf {
    resolve_tool("TAKEOUT_EMBED_FFMPEG_PATH", "ffmpeg")
}

/// Get path to the macOS SetFile binary (Finder date attribute)
pub fn setfile_path() -> PathBuf {
    resolve_tool("TAKEOUT_EMBED_SETFILE_PATH", "SetFile")
}

/// Check if a tool is available at the resolved path
pub fn is_tool_available(tool: &str) -> bool {
    let path = match tool {
        "exiftool" => exiftool_path(),
        "ffmpeg" => ffmpeg_path(),
        "SetFile" => setfile_path(),
        _ => return false,
    };

    // If path exists as a file, it's available
    if path.exists() {
        return true;
    }

    // Otherwise try running it (for PATH fallback)
    std::process::Command::new(&path)
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

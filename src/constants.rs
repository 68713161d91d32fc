// Takeout Embed constants
// Extension lists and format strings follow the export service's naming
// conventions; the three sink date formats are not interchangeable.

// Image extensions (lowercase, no dot)
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "heic"];

// Video extensions
pub const VIDEO_EXTENSIONS: [&str; 2] = ["mp4", "mov"];

// Sidecar filename suffixes, in match-preference order
pub const SIDECAR_SUFFIXES: [&str; 2] = ["supplemental-metadata.json", "suppl.json"];

// Marker inserted before the extension of transcoded video outputs
pub const WITHMETA_MARKER: &str = "_withmeta";

// Manifest written into the processed directory
pub const MANIFEST_FILENAME: &str = "manifest.csv";
pub const MANIFEST_COLUMNS: [&str; 5] = ["base_name", "image", "video", "video_withmeta", "metadata"];

// Flat metadata keys carrying the capture timestamp, preferred first
pub const TAKEN_TIME_KEY: &str = "photoTakenTime_timestamp";
pub const CREATION_TIME_KEY: &str = "creationTime_timestamp";

// Date formats per sink
pub const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
pub const CONTAINER_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const FINDER_DATE_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

// Fallback written by the creation-date sweep when an image has no capture tag
pub const DEFAULT_CREATE_DATE: &str = "2000:01:01 00:00:00";

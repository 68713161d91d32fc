// Flat-metadata to exiftool tag mapping

use std::collections::BTreeMap;
use serde_json::Value;

use crate::flatten::FlatMetadata;
use crate::pairing::MediaKind;
use crate::timestamp::{best_timestamp, exif_date};

/// Target-tag identifier -> stringified value, ready to hand to the
/// tag-embedding tool.
pub type TagMapping = BTreeMap<String, String>;

/// Allow-list for images: flat key -> target tag.
const IMAGE_TAG_MAP: [(&str, &str); 8] = [
    ("title", "XMP:Title"),
    ("description", "XMP:Description"),
    ("imageViews", "XMP:ImageViews"),
    ("geoData_latitude", "EXIF:GPSLatitude"),
    ("geoData_longitude", "EXIF:GPSLongitude"),
    ("geoData_altitude", "EXIF:GPSAltitude"),
    ("url", "XMP:URL"),
    ("googlePhotosOrigin_mobileUpload_deviceType", "XMP:DeviceType"),
];

/// Allow-list for videos.
const VIDEO_TAG_MAP: [(&str, &str); 3] = [
    ("title", "XMP:Title"),
    ("description", "XMP:Description"),
    ("url", "XMP:URL"),
];

/// Date tags written per kind when a capture timestamp exists. Videos get
/// every date field a container exposes so they all agree.
const IMAGE_DATE_TAGS: [&str; 2] = ["EXIF:DateTimeOriginal", "XMP:CreateDate"];
const VIDEO_DATE_TAGS: [&str; 5] = [
    "XMP:CreateDate",
    "QuickTime:CreateDate",
    "QuickTime:ModifyDate",
    "QuickTime:ContentCreateDate",
    "QuickTime:ContentModifyDate",
];

/// Map flattened sidecar metadata onto the tag set for a media kind.
/// Keys outside the allow-list are dropped; missing optional fields simply
/// produce fewer tags.
pub fn map_tags(flat: &FlatMetadata, kind: MediaKind) -> TagMapping {
    let allow_list: &[(&str, &str)] = match kind {
        MediaKind::Image => &IMAGE_TAG_MAP,
        MediaKind::Video => &VIDEO_TAG_MAP,
    };

    let mut tags = TagMapping::new();
    for (key, tag) in allow_list {
        if let Some(value) = flat.get(*key) {
            tags.insert((*tag).to_string(), stringify(value));
        }
    }

    if let Some(date) = best_timestamp(flat).and_then(exif_date) {
        let date_tags: &[&str] = match kind {
            MediaKind::Image => &IMAGE_DATE_TAGS,
            MediaKind::Video => &VIDEO_DATE_TAGS,
        };
        for tag in date_tags {
            tags.insert((*tag).to_string(), date.clone());
        }
    }

    tags
}

/// Render a JSON leaf as a tag value.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

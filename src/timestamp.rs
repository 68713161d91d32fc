// Best-timestamp derivation and per-sink date rendering
//
// Every date field this tool writes (EXIF/XMP tags, container metadata,
// filesystem and Finder dates) derives from the one epoch value returned
// by best_timestamp. Each sink needs its own string format; render from
// the epoch, never from another sink's string.

use chrono::DateTime;
use serde_json::Value;

use crate::constants::{
    CONTAINER_DATE_FORMAT, CREATION_TIME_KEY, EXIF_DATE_FORMAT, FINDER_DATE_FORMAT, TAKEN_TIME_KEY,
};
use crate::flatten::FlatMetadata;

/// The canonical capture time for a sidecar: the photo-taken timestamp when
/// present, otherwise the upload/creation timestamp. Epoch seconds.
pub fn best_timestamp(flat: &FlatMetadata) -> Option<i64> {
    epoch_field(flat, TAKEN_TIME_KEY).or_else(|| epoch_field(flat, CREATION_TIME_KEY))
}

/// Sidecars carry epoch values as decimal strings; tolerate plain numbers too.
fn epoch_field(flat: &FlatMetadata, key: &str) -> Option<i64> {
    match flat.get(key)? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// `YYYY:MM:DD HH:MM:SS`, the format exiftool tag values take.
pub fn exif_date(epoch: i64) -> Option<String> {
    format_epoch(epoch, EXIF_DATE_FORMAT)
}

/// `YYYY-MM-DDTHH:MM:SS`, the format ffmpeg's creation_time field takes.
pub fn container_date(epoch: i64) -> Option<String> {
    format_epoch(epoch, CONTAINER_DATE_FORMAT)
}

/// `MM/DD/YYYY HH:MM:SS`, the format SetFile's -d flag takes.
pub fn finder_date(epoch: i64) -> Option<String> {
    format_epoch(epoch, FINDER_DATE_FORMAT)
}

fn format_epoch(epoch: i64, format: &str) -> Option<String> {
    DateTime::from_timestamp(epoch, 0).map(|dt| dt.format(format).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(entries: &[(&str, Value)]) -> FlatMetadata {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_taken_time_wins_when_both_present() {
        let flat = flat(&[
            ("photoTakenTime_timestamp", json!("1000")),
            ("creationTime_timestamp", json!("2000")),
        ]);
        assert_eq!(best_timestamp(&flat), Some(1000));
    }

    #[test]
    fn test_creation_time_fallback() {
        let flat = flat(&[("creationTime_timestamp", json!("2000"))]);
        assert_eq!(best_timestamp(&flat), Some(2000));
    }

    #[test]
    fn test_absent_timestamps() {
        let flat = flat(&[("title", json!("T"))]);
        assert_eq!(best_timestamp(&flat), None);
    }

    #[test]
    fn test_numeric_epoch_accepted() {
        let flat = flat(&[("photoTakenTime_timestamp", json!(1600000000))]);
        assert_eq!(best_timestamp(&flat), Some(1600000000));
    }

    #[test]
    fn test_unparseable_taken_time_falls_through() {
        let flat = flat(&[
            ("photoTakenTime_timestamp", json!("not-a-number")),
            ("creationTime_timestamp", json!("2000")),
        ]);
        assert_eq!(best_timestamp(&flat), Some(2000));
    }

    #[test]
    fn test_three_sink_formats_from_one_epoch() {
        // 2020-09-13 12:26:40 UTC
        let epoch = 1_600_000_000;
        assert_eq!(exif_date(epoch).unwrap(), "2020:09:13 12:26:40");
        assert_eq!(container_date(epoch).unwrap(), "2020-09-13T12:26:40");
        assert_eq!(finder_date(epoch).unwrap(), "09/13/2020 12:26:40");
    }

    #[test]
    fn test_zero_padding() {
        // 2001-02-03 04:05:06 UTC
        let epoch = 981_173_106;
        assert_eq!(exif_date(epoch).unwrap(), "2001:02:03 04:05:06");
        assert_eq!(finder_date(epoch).unwrap(), "02/03/2001 04:05:06");
    }
}

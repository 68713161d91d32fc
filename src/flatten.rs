// Sidecar JSON flattening

use std::collections::BTreeMap;
use serde_json::Value;
use crate::error::{Result, TakeoutEmbedError};

/// Flat key-value view of a nested sidecar object. Keys are the `_`-joined
/// paths of the source object; values are the untouched JSON leaves
/// (arrays count as leaves).
pub type FlatMetadata = BTreeMap<String, Value>;

/// Flatten a parsed sidecar document into a single-level mapping.
/// The top level must be a JSON object.
pub fn flatten(value: &Value) -> Result<FlatMetadata> {
    let obj = value.as_object().ok_or_else(|| {
        TakeoutEmbedError::MalformedMetadata("top-level value is not a JSON object".to_string())
    })?;

    let mut out = FlatMetadata::new();
    flatten_into(obj, "", &mut out);
    Ok(out)
}

fn flatten_into(obj: &serde_json::Map<String, Value>, prefix: &str, out: &mut FlatMetadata) {
    for (key, value) in obj {
        match value {
            Value::Object(nested) => {
                let next_prefix = format!("{}{}_", prefix, key);
                flatten_into(nested, &next_prefix, out);
            }
            leaf => {
                out.insert(format!("{}{}", prefix, key), leaf.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_object() {
        let doc = json!({
            "title": "Beach day",
            "photoTakenTime": { "timestamp": "1600000000", "formatted": "Sep 13, 2020" },
            "geoData": { "latitude": 12.5, "longitude": -3.25 }
        });

        let flat = flatten(&doc).unwrap();
        assert_eq!(flat.get("title"), Some(&json!("Beach day")));
        assert_eq!(flat.get("photoTakenTime_timestamp"), Some(&json!("1600000000")));
        assert_eq!(flat.get("geoData_latitude"), Some(&json!(12.5)));
        assert_eq!(flat.get("geoData_longitude"), Some(&json!(-3.25)));
        // No structural keys survive
        assert!(!flat.contains_key("photoTakenTime"));
        assert!(!flat.contains_key("geoData"));
    }

    #[test]
    fn test_flatten_deep_nesting() {
        let doc = json!({
            "googlePhotosOrigin": { "mobileUpload": { "deviceType": "ANDROID_PHONE" } }
        });
        let flat = flatten(&doc).unwrap();
        assert_eq!(
            flat.get("googlePhotosOrigin_mobileUpload_deviceType"),
            Some(&json!("ANDROID_PHONE"))
        );
        assert_eq!(flat.len(), 1);
    }

    #[test]
    fn test_arrays_are_leaves() {
        let doc = json!({ "people": [{ "name": "A" }, { "name": "B" }] });
        let flat = flatten(&doc).unwrap();
        assert_eq!(flat.get("people"), Some(&json!([{ "name": "A" }, { "name": "B" }])));
    }

    #[test]
    fn test_scalar_leaves_keep_types() {
        let doc = json!({ "views": 3, "favorited": true, "caption": null });
        let flat = flatten(&doc).unwrap();
        assert_eq!(flat.get("views"), Some(&json!(3)));
        assert_eq!(flat.get("favorited"), Some(&json!(true)));
        assert_eq!(flat.get("caption"), Some(&Value::Null));
    }

    #[test]
    fn test_non_object_top_level_is_malformed() {
        for doc in [json!([1, 2]), json!("text"), json!(42), Value::Null] {
            let err = flatten(&doc).unwrap_err();
            assert!(matches!(err, TakeoutEmbedError::MalformedMetadata(_)));
        }
    }

    /// Re-nesting by splitting keys on `_` reconstructs the source object
    /// when no key contains the joiner itself.
    #[test]
    fn test_flatten_is_lossless_for_joiner_free_keys() {
        let doc = json!({
            "a": { "b": { "c": 1 }, "d": "x" },
            "e": true
        });
        let flat = flatten(&doc).unwrap();

        let mut rebuilt = json!({});
        for (key, value) in &flat {
            let mut node = &mut rebuilt;
            let parts: Vec<&str> = key.split('_').collect();
            for part in &parts[..parts.len() - 1] {
                node = node
                    .as_object_mut()
                    .unwrap()
                    .entry(part.to_string())
                    .or_insert_with(|| json!({}));
            }
            node.as_object_mut()
                .unwrap()
                .insert(parts[parts.len() - 1].to_string(), value.clone());
        }

        assert_eq!(rebuilt, doc);
    }
}

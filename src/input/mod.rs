use anyhow::Context;
use serde_json::Value;
use std::path::Path;

use crate::Result;

/// Object keys that may carry a reference, in priority order
const REFERENCE_KEYS: &[&str] = &["target_url", "url", "video_url"];

/// Load video references from a JSON input file
///
/// Accepts an array of strings or objects, or an object with a `urls` array.
pub fn load_input_urls(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        anyhow::bail!("Input URL file not found at {}", path.display());
    }

    let content = fs_err::read_to_string(path)?;
    let data: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file {}", path.display()))?;

    Ok(references_from_json(&data))
}

/// Extract references from an already-parsed input document
pub fn references_from_json(data: &Value) -> Vec<String> {
    let items: &[Value] = match data {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("urls") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    items.iter().filter_map(reference_from_item).collect()
}

fn reference_from_item(item: &Value) -> Option<String> {
    match item {
        Value::String(url) => Some(url.clone()),
        Value::Object(map) => REFERENCE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

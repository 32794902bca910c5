//! Turns raw search hits into a bounded, deduplicated evidence list.

use std::collections::HashSet;

use serde_json::Value;

use crate::types::EvidenceItem;

pub const MAX_SNIPPET_CHARS: usize = 600;
pub const NO_TITLE: &str = "(no title)";

/// Normalize raw hits. Never fails: anything missing or of the wrong type
/// falls back to a placeholder. Order of first occurrence is kept and the
/// first hit for a given url wins.
pub fn normalize(raw: &[Value]) -> Vec<EvidenceItem> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(normalize_hit)
        .filter(|item| seen.insert(item.url.clone()))
        .collect()
}

fn normalize_hit(hit: &Value) -> EvidenceItem {
    let title = non_empty_str(hit, "title").unwrap_or(NO_TITLE);
    let url = non_empty_str(hit, "url").unwrap_or("");
    let body = non_empty_str(hit, "content")
        .or_else(|| non_empty_str(hit, "snippet"))
        .unwrap_or("");
    EvidenceItem {
        title: title.to_string(),
        url: url.to_string(),
        snippet: truncate_chars(body, MAX_SNIPPET_CHARS),
    }
}

fn non_empty_str<'a>(hit: &'a Value, key: &str) -> Option<&'a str> {
    hit.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

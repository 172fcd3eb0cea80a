//! Payload normalization.
//!
//! Turns whatever the upstream model sent into a JSON value. Text payloads are
//! parsed directly when possible; otherwise every balanced `{...}` / `[...]`
//! span is tried in order of its opening bracket until one parses and looks
//! like a detection.

use std::borrow::Cow;

use serde_json::Value;

use super::extract::{X1_KEYS, Y1_KEYS};
use crate::constants::MAX_FRAGMENT_DEPTH;

/// A coordinates payload of unspecified shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// Text: pure JSON, or prose with JSON fragments embedded in it
    Text(String),
    /// An already parsed JSON value
    Json(Value),
}

impl From<&str> for RawPayload {
    fn from(text: &str) -> Self {
        RawPayload::Text(text.to_string())
    }
}

impl From<String> for RawPayload {
    fn from(text: String) -> Self {
        RawPayload::Text(text)
    }
}

impl From<Value> for RawPayload {
    fn from(value: Value) -> Self {
        RawPayload::Json(value)
    }
}

/// Recover a JSON value from a payload.
///
/// Pre-parsed values are borrowed unchanged, except JSON strings which are
/// treated as text. Returns `None` when no plausible JSON can be found.
pub fn normalize(raw: &RawPayload) -> Option<Cow<'_, Value>> {
    match raw {
        RawPayload::Text(text) => normalize_text(text).map(Cow::Owned),
        RawPayload::Json(Value::String(text)) => normalize_text(text).map(Cow::Owned),
        RawPayload::Json(value) => Some(Cow::Borrowed(value)),
    }
}

fn normalize_text(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    for (start, end) in balanced_spans(trimmed) {
        let fragment = &trimmed[start..end];
        match serde_json::from_str::<Value>(fragment) {
            Ok(value) if is_plausible_detection(&value) => {
                log::trace!("Selected JSON fragment at {}..{}", start, end);
                return Some(value);
            }
            Ok(_) => log::trace!("Fragment at {}..{} is not a detection", start, end),
            Err(e) => log::trace!("Fragment at {}..{} failed to parse: {}", start, end, e),
        }
    }

    log::debug!("No JSON detection found in {} bytes of text", trimmed.len());
    None
}

/// Whether a parsed fragment plausibly describes one or more detections.
pub(crate) fn is_plausible_detection(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => {
            map.contains_key("bbox")
                || (X1_KEYS.iter().any(|k| map.contains_key(*k))
                    && Y1_KEYS.iter().any(|k| map.contains_key(*k)))
        }
        _ => false,
    }
}

/// Find every balanced bracket span, ordered by opening position.
///
/// Brackets inside JSON string literals are ignored. An opening bracket whose
/// closer never arrives, or is the wrong kind, produces no span; the brackets
/// nested inside it still do. A quote in prose inside such a bracket can make
/// the rest of the text look like one long string, so a scan that ends inside
/// a string is followed by a second scan that ignores quotes.
fn balanced_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    if scan_spans(bytes, true, &mut spans) {
        log::trace!("Scan ended inside a string, rescanning without quotes");
        scan_spans(bytes, false, &mut spans);
    }

    spans.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    spans.dedup();
    spans
}

/// An opening bracket waiting for its closer.
struct Opener {
    kind: u8,
    pos: usize,
    /// Deepest stack height reached while this opener was open
    peak: usize,
}

/// One pass over `bytes`, pushing the spans it closes.
///
/// Returns `true` when the text ended inside a string.
fn scan_spans(bytes: &[u8], track_strings: bool, spans: &mut Vec<(usize, usize)>) -> bool {
    let mut stack: Vec<Opener> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            // Quotes only count once we are inside a bracket; prose quotes are noise.
            b'"' if track_strings && !stack.is_empty() => in_string = true,
            b'{' | b'[' => stack.push(Opener {
                kind: b,
                pos: i,
                peak: stack.len() + 1,
            }),
            b'}' | b']' => {
                let open = if b == b'}' { b'{' } else { b'[' };
                let Some(depth) = stack.iter().rposition(|o| o.kind == open) else {
                    continue;
                };
                let start = stack[depth].pos;
                let peak = stack[depth..].iter().map(|o| o.peak).max().unwrap_or(depth + 1);
                stack.truncate(depth);
                if let Some(parent) = stack.last_mut() {
                    parent.peak = parent.peak.max(peak);
                }

                let nesting = peak - depth;
                if nesting > MAX_FRAGMENT_DEPTH {
                    log::trace!("Skipping fragment at {}..{}: nested {} deep", start, i + 1, nesting);
                } else {
                    spans.push((start, i + 1));
                }
            }
            _ => {}
        }
    }

    in_string
}

//! Field extraction from loosely-typed detection records.
//!
//! A record is run through an ordered list of matchers; the first one that
//! recognizes it wins. Each matcher either yields a complete set of fields or
//! nothing, so a record never contributes a box built from guessed geometry.

use serde_json::{Map, Value};

use crate::constants::{DEFAULT_LABEL_PREFIX, QUAD_LEN};

/// Candidate keys for the left edge, in priority order.
pub const X1_KEYS: &[&str] = &["x", "x1", "left", "startX"];
/// Candidate keys for the top edge.
pub const Y1_KEYS: &[&str] = &["y", "y1", "top", "startY"];
/// Candidate keys for the width.
pub const WIDTH_KEYS: &[&str] = &["width", "w", "dx"];
/// Candidate keys for the height.
pub const HEIGHT_KEYS: &[&str] = &["height", "h", "dy"];
/// Candidate keys for the right edge.
pub const X2_KEYS: &[&str] = &["x2", "right", "endX"];
/// Candidate keys for the bottom edge.
pub const Y2_KEYS: &[&str] = &["y2", "bottom", "endY"];
/// Candidate keys for the label.
pub const LABEL_KEYS: &[&str] = &["label", "name", "class", "type", "category"];

/// Normalized fields of one detection.
///
/// `width` and `height` are always resolved: either given by the record or
/// derived from the opposite corner. `x2`/`y2` are kept when the record had
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    /// Left edge, normalized
    pub x1: f64,
    /// Top edge, normalized
    pub y1: f64,
    /// Normalized width; negative when the corners were reversed
    pub width: f64,
    /// Normalized height; negative when the corners were reversed
    pub height: f64,
    /// Right edge, if the record gave one
    pub x2: Option<f64>,
    /// Bottom edge, if the record gave one
    pub y2: Option<f64>,
    /// Record label, or a synthesized one
    pub label: String,
}

impl ExtractedFields {
    fn from_corners([x1, y1, x2, y2]: [f64; 4], label: String) -> Self {
        Self {
            x1,
            y1,
            width: x2 - x1,
            height: y2 - y1,
            x2: Some(x2),
            y2: Some(y2),
            label,
        }
    }

    /// Swap reversed edges so that the size is non-negative and `x1`/`y1`
    /// name the top-left corner.
    pub fn normalized(mut self) -> Self {
        if self.width < 0.0 {
            let right = self.x1;
            self.x1 += self.width;
            self.width = -self.width;
            self.x2 = self.x2.map(|_| right);
        }
        if self.height < 0.0 {
            let bottom = self.y1;
            self.y1 += self.height;
            self.height = -self.height;
            self.y2 = self.y2.map(|_| bottom);
        }
        self
    }
}

/// Source of the label used when a record has none.
struct LabelFallback<'a> {
    prefix: &'a str,
    index: usize,
}

impl LabelFallback<'_> {
    fn synthesize(&self) -> String {
        format!("{} {}", self.prefix, self.index + 1)
    }

    fn or_synthesize(&self, label: Option<String>) -> String {
        label.unwrap_or_else(|| self.synthesize())
    }
}

type Matcher = fn(&Value, &LabelFallback<'_>) -> Option<ExtractedFields>;

static MATCHERS: &[(&str, Matcher)] = &[
    ("quad", match_quad),
    ("bbox", match_bbox),
    ("explicit", match_explicit),
    ("synonyms", match_synonyms),
];

/// Extract fields from `record`, the `index`-th record of its payload.
pub fn extract(record: &Value, index: usize) -> Option<ExtractedFields> {
    extract_with_prefix(record, index, DEFAULT_LABEL_PREFIX)
}

/// Like [`extract`], with a custom prefix for synthesized labels.
pub fn extract_with_prefix(record: &Value, index: usize, prefix: &str) -> Option<ExtractedFields> {
    let fallback = LabelFallback { prefix, index };
    MATCHERS.iter().find_map(|(name, matcher)| {
        let fields = matcher(record, &fallback)?;
        log::trace!("Record {} matched {} matcher", index, name);
        Some(fields)
    })
}

/// `[x1, y1, x2, y2, ...]`
fn match_quad(record: &Value, fallback: &LabelFallback<'_>) -> Option<ExtractedFields> {
    let corners = quad(record.as_array()?)?;
    Some(ExtractedFields::from_corners(corners, fallback.synthesize()))
}

/// `{"bbox": [x1, y1, x2, y2], "label": ...}`
fn match_bbox(record: &Value, fallback: &LabelFallback<'_>) -> Option<ExtractedFields> {
    let map = record.as_object()?;
    let corners = quad(map.get("bbox")?.as_array()?)?;
    Some(ExtractedFields::from_corners(
        corners,
        fallback.or_synthesize(explicit_label(map)),
    ))
}

/// `{"x": .., "y": .., "width": .., "height": ..}`
fn match_explicit(record: &Value, fallback: &LabelFallback<'_>) -> Option<ExtractedFields> {
    let map = record.as_object()?;
    let number = |key: &str| map.get(key).and_then(coerce_number);
    Some(ExtractedFields {
        x1: number("x")?,
        y1: number("y")?,
        width: number("width")?,
        height: number("height")?,
        x2: None,
        y2: None,
        label: fallback.or_synthesize(explicit_label(map)),
    })
}

/// Any mix of the synonym keys, deriving the size from corners if needed.
fn match_synonyms(record: &Value, fallback: &LabelFallback<'_>) -> Option<ExtractedFields> {
    let map = record.as_object()?;
    let x1 = number_field(map, X1_KEYS)?;
    let y1 = number_field(map, Y1_KEYS)?;
    let x2 = number_field(map, X2_KEYS);
    let y2 = number_field(map, Y2_KEYS);
    let width = number_field(map, WIDTH_KEYS).or_else(|| x2.map(|x2| x2 - x1))?;
    let height = number_field(map, HEIGHT_KEYS).or_else(|| y2.map(|y2| y2 - y1))?;

    Some(ExtractedFields {
        x1,
        y1,
        width,
        height,
        x2,
        y2,
        label: fallback.or_synthesize(synonym_label(map)),
    })
}

fn quad(items: &[Value]) -> Option<[f64; 4]> {
    if items.len() < QUAD_LEN {
        return None;
    }
    Some([
        coerce_number(&items[0])?,
        coerce_number(&items[1])?,
        coerce_number(&items[2])?,
        coerce_number(&items[3])?,
    ])
}

/// The value of the first candidate key that is present and not `null`.
fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|value| !value.is_null()))
}

/// Only the first present key is consulted; an unparsable value there makes
/// the whole field absent.
fn number_field(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    first_present(map, keys).and_then(coerce_number)
}

/// Numbers, or strings holding a finite number.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn explicit_label(map: &Map<String, Value>) -> Option<String> {
    map.get("label").and_then(Value::as_str).and_then(non_blank)
}

fn synonym_label(map: &Map<String, Value>) -> Option<String> {
    match first_present(map, LABEL_KEYS)? {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

//! Shape classification of a normalized payload.

use serde_json::{Map, Value};

use crate::constants::QUAD_LEN;

/// The detection layout a JSON value follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    /// A single `[x1, y1, x2, y2, ...]` detection
    FlatQuad(&'a [Value]),
    /// One record per element
    RecordArray(&'a [Value]),
    /// One record as an object
    SingleRecord(&'a Map<String, Value>),
    /// Nothing boxes can be built from
    Unrecognized,
}

impl Shape<'_> {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::FlatQuad(_) => "flat quad",
            Shape::RecordArray(_) => "record array",
            Shape::SingleRecord(_) => "single record",
            Shape::Unrecognized => "unrecognized",
        }
    }
}

/// Classify a value. Depends on nothing but the value itself.
pub fn classify(value: &Value) -> Shape<'_> {
    match value {
        Value::Array(items) if items.len() >= QUAD_LEN && items[0].is_number() => {
            Shape::FlatQuad(items)
        }
        Value::Array(items) if !items.is_empty() => Shape::RecordArray(items),
        Value::Object(map) => Shape::SingleRecord(map),
        _ => Shape::Unrecognized,
    }
}

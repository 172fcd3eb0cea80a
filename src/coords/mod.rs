//! Coordinate decoding: upstream model output to canvas bounding boxes.
//!
//! The pipeline has four pure stages:
//!
//! - [`normalize`]: recover a JSON value from text, tolerating prose, code
//!   fences and truncated output around it
//! - [`classify`]: decide which [`Shape`] the value has
//! - [`extract()`]: pull normalized coordinates and a label out of each record
//! - [`to_box`]: map normalized coordinates onto the displayed image
//!
//! [`decode`] runs all of them. It never fails: anything that cannot be
//! understood simply produces fewer boxes.
//!
//! ```rust,ignore
//! use rsmark::coords::{decode, RawPayload};
//! use rsmark::ImageGeometry;
//!
//! let image = ImageGeometry::new(10.0, 20.0, 100.0, 50.0)?;
//! let boxes = decode(&RawPayload::from("[0.0, 0.0, 1.0, 1.0]"), &image);
//! assert_eq!(boxes[0].label, "Object 1");
//! ```

mod extract;
mod mapper;
mod payload;
mod shape;

#[cfg(test)]
mod tests;

pub use extract::{
    ExtractedFields, HEIGHT_KEYS, LABEL_KEYS, WIDTH_KEYS, X1_KEYS, X2_KEYS, Y1_KEYS, Y2_KEYS,
    extract, extract_with_prefix,
};
pub use mapper::to_box;
pub use payload::{RawPayload, normalize};
pub use shape::{Shape, classify};

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_LABEL_PREFIX;
use crate::geometry::{CanonicalBox, ImageGeometry};

/// What to do with records whose corners are reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CornerPolicy {
    /// Keep the record as given; the box gets a negative width or height
    #[default]
    Preserve,
    /// Swap edges so every box has a non-negative size
    Normalize,
}

/// Options for [`decode_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Prefix for synthesized labels
    pub label_prefix: String,
    /// Handling of reversed corners
    pub corner_policy: CornerPolicy,
}

impl DecodeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prefix for synthesized labels.
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Set the reversed-corner handling.
    pub fn with_corner_policy(mut self, policy: CornerPolicy) -> Self {
        self.corner_policy = policy;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            corner_policy: CornerPolicy::default(),
        }
    }
}

/// Decode a payload into boxes over `image` with default options.
pub fn decode(raw: &RawPayload, image: &ImageGeometry) -> Vec<CanonicalBox> {
    decode_with(raw, image, &DecodeOptions::default())
}

/// Decode a payload into boxes over `image`.
///
/// Output order follows input order. Records that cannot be extracted are
/// dropped without affecting the others.
pub fn decode_with(
    raw: &RawPayload,
    image: &ImageGeometry,
    options: &DecodeOptions,
) -> Vec<CanonicalBox> {
    let Some(value) = normalize(raw) else {
        log::debug!("Payload holds no JSON, no boxes");
        return Vec::new();
    };

    let shape = classify(&value);
    let prefix = options.label_prefix.as_str();
    let fields: Vec<ExtractedFields> = match shape {
        Shape::FlatQuad(_) | Shape::SingleRecord(_) => {
            extract_with_prefix(&value, 0, prefix).into_iter().collect()
        }
        Shape::RecordArray(records) => records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                let fields = extract_with_prefix(record, index, prefix);
                if fields.is_none() {
                    log::trace!("Skipping record {}: not enough geometry", index);
                }
                fields
            })
            .collect(),
        Shape::Unrecognized => Vec::new(),
    };

    let boxes: Vec<CanonicalBox> = fields
        .into_iter()
        .map(|f| match options.corner_policy {
            CornerPolicy::Preserve => f,
            CornerPolicy::Normalize => f.normalized(),
        })
        .map(|f| to_box(f, image))
        .collect();

    log::debug!("Decoded {} boxes from {} payload", boxes.len(), shape.name());
    boxes
}

/// Decode several payloads that the caller chose to show together.
///
/// Boxes are appended in payload order. Synthesized labels restart for each
/// payload.
pub fn decode_concatenated<'a, I>(
    payloads: I,
    image: &ImageGeometry,
    options: &DecodeOptions,
) -> Vec<CanonicalBox>
where
    I: IntoIterator<Item = &'a RawPayload>,
{
    payloads
        .into_iter()
        .flat_map(|raw| decode_with(raw, image, options))
        .collect()
}

//! Global constants for rsmark

/// Prefix for labels synthesized for records that carry none ("Object 1", ...)
pub const DEFAULT_LABEL_PREFIX: &str = "Object";

/// Fraction of the canvas a freshly loaded image may occupy in each dimension
pub const DEFAULT_CANVAS_FILL_FRACTION: f64 = 0.8;

/// Number of colors in the box palette
pub const PALETTE_SIZE: usize = 5;

/// Minimum number of leading numbers in a flat `[x1, y1, x2, y2]` record
pub const QUAD_LEN: usize = 4;

/// Deepest bracket nesting a fragment may have and still be parsed
pub const MAX_FRAGMENT_DEPTH: usize = 128;

//! Pipeline-level tests for coordinate decoding.
//!
//! Per-stage behavior is covered next to each stage; these tests run whole
//! payloads through [`decode`](super::decode).


use crate::geometry::CanonicalBox;

pub(super) const EPSILON: f64 = 1e-9;

pub(super) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Assert a box matches `(x, y, width, height, label)`.
pub(super) fn assert_box(actual: &CanonicalBox, expected: (f64, f64, f64, f64, &str)) {
    let (x, y, width, height, label) = expected;
    assert!(
        approx_eq(actual.x, x)
            && approx_eq(actual.y, y)
            && approx_eq(actual.width, width)
            && approx_eq(actual.height, height),
        "expected ({x}, {y}, {width}, {height}), got {actual:?}"
    );
    assert_eq!(actual.label, label);
}

//! Normalized fields to canvas pixels.

use super::extract::ExtractedFields;
use crate::geometry::{CanonicalBox, ImageGeometry};

/// Map normalized fields onto the displayed image.
///
/// No clamping: coordinates outside `[0, 1]` land outside the image.
pub fn to_box(fields: ExtractedFields, image: &ImageGeometry) -> CanonicalBox {
    CanonicalBox {
        x: fields.x1 * image.width + image.x,
        y: fields.y1 * image.height + image.y,
        width: fields.width * image.width,
        height: fields.height * image.height,
        label: fields.label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn fields(x1: f64, y1: f64, width: f64, height: f64) -> ExtractedFields {
        ExtractedFields {
            x1,
            y1,
            width,
            height,
            x2: None,
            y2: None,
            label: "a".into(),
        }
    }

    #[test]
    fn test_offset_and_scale() {
        let image = ImageGeometry::new(10.0, 20.0, 200.0, 100.0).unwrap();
        let b = to_box(fields(0.25, 0.5, 0.5, 0.25), &image);
        assert!(approx_eq(b.x, 60.0));
        assert!(approx_eq(b.y, 70.0));
        assert!(approx_eq(b.width, 100.0));
        assert!(approx_eq(b.height, 25.0));
        assert_eq!(b.label, "a");
    }

    #[test]
    fn test_out_of_range_not_clamped() {
        let image = ImageGeometry::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let b = to_box(fields(-0.1, 0.9, 0.3, 0.2), &image);
        assert!(approx_eq(b.x, -10.0));
        assert!(approx_eq(b.y + b.height, 110.0));
    }

    #[test]
    fn test_negative_size_passes_through() {
        let image = ImageGeometry::unit();
        let b = to_box(fields(0.6, 0.5, -0.4, -0.2), &image);
        assert!(b.is_reversed());
        assert!(approx_eq(b.width, -0.4));
    }
}

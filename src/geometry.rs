//! On-screen geometry types.
//!
//! [`ImageGeometry`] describes where the displayed image sits inside the
//! canvas, [`CanonicalBox`] is a detection in absolute canvas pixels.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Position and rendered size of the displayed image within the canvas.
///
/// The rendered size usually differs from the native pixel size because the
/// image is scaled down to fit the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Left edge in canvas space
    pub x: f64,
    /// Top edge in canvas space
    pub y: f64,
    /// Rendered width
    pub width: f64,
    /// Rendered height
    pub height: f64,
}

impl ImageGeometry {
    /// Create a geometry, rejecting non-positive or non-finite sizes.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(Error::invalid_geometry(format!(
                "non-finite geometry ({x}, {y}, {width}, {height})"
            )));
        }
        if width <= 0.0 || height <= 0.0 {
            return Err(Error::invalid_geometry(format!(
                "size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// The unit square at the origin. Mapping through it leaves normalized
    /// coordinates unchanged.
    pub fn unit() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    /// Parse `"X,Y,W,H"`.
    pub fn parse(text: &str) -> Result<Self> {
        let parts = text
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::invalid_argument(format!("geometry '{text}': {e}")))?;
        match parts.as_slice() {
            [x, y, w, h] => Self::new(*x, *y, *w, *h),
            _ => Err(Error::invalid_argument(format!(
                "geometry '{text}' must have four comma-separated values"
            ))),
        }
    }

    /// Place an image of the given native size inside a canvas.
    ///
    /// The image is scaled down (never up) until it fits inside
    /// `fill_fraction` of the canvas in both dimensions, width first, then
    /// height, keeping its aspect ratio. The result is centered in the canvas.
    pub fn fit_to_canvas(
        native_width: u32,
        native_height: u32,
        canvas_width: f64,
        canvas_height: f64,
        fill_fraction: f64,
    ) -> Result<Self> {
        if native_width == 0 || native_height == 0 {
            return Err(Error::invalid_geometry(format!(
                "image has no pixels ({native_width}x{native_height})"
            )));
        }
        if !(fill_fraction > 0.0 && fill_fraction <= 1.0) {
            return Err(Error::invalid_argument(format!(
                "fill fraction must be in (0, 1], got {fill_fraction}"
            )));
        }

        let mut width = native_width as f64;
        let mut height = native_height as f64;
        let max_width = canvas_width * fill_fraction;
        let max_height = canvas_height * fill_fraction;

        if width > max_width {
            let scale = max_width / width;
            width = max_width;
            height *= scale;
        }
        if height > max_height {
            let scale = max_height / height;
            height = max_height;
            width *= scale;
        }

        Self::new(
            (canvas_width - width) / 2.0,
            (canvas_height - height) / 2.0,
            width,
            height,
        )
    }
}

/// A detection in absolute canvas pixels, ready for rendering.
///
/// `width` and `height` may be negative when the source corners were
/// reversed and the corner policy preserves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBox {
    /// Left edge (or the x1 corner when reversed)
    pub x: f64,
    /// Top edge (or the y1 corner when reversed)
    pub y: f64,
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
    /// Object label
    pub label: String,
}

impl CanonicalBox {
    /// Whether the box extends in a negative direction.
    pub fn is_reversed(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_new_rejects_empty_size() {
        assert!(ImageGeometry::new(0.0, 0.0, 0.0, 10.0).is_err());
        assert!(ImageGeometry::new(0.0, 0.0, 10.0, -1.0).is_err());
        assert!(ImageGeometry::new(f64::NAN, 0.0, 10.0, 10.0).is_err());
        assert!(ImageGeometry::new(5.0, 5.0, 10.0, 10.0).is_ok());
    }

    #[test]
    fn test_parse_geometry() {
        let geometry = ImageGeometry::parse("10, 20,100,50").unwrap();
        assert_eq!(geometry, ImageGeometry::new(10.0, 20.0, 100.0, 50.0).unwrap());

        assert!(ImageGeometry::parse("1,2,3").is_err());
        assert!(ImageGeometry::parse("a,b,c,d").is_err());
        assert!(ImageGeometry::parse("0,0,0,5").is_err());
    }

    #[test]
    fn test_fit_small_image_is_centered_unscaled() {
        let geometry = ImageGeometry::fit_to_canvas(200, 100, 1000.0, 800.0, 0.8).unwrap();
        assert!(approx_eq(geometry.width, 200.0));
        assert!(approx_eq(geometry.height, 100.0));
        assert!(approx_eq(geometry.x, 400.0));
        assert!(approx_eq(geometry.y, 350.0));
    }

    #[test]
    fn test_fit_wide_image_scales_by_width() {
        // max width 800, scale 0.5
        let geometry = ImageGeometry::fit_to_canvas(1600, 400, 1000.0, 1000.0, 0.8).unwrap();
        assert!(approx_eq(geometry.width, 800.0));
        assert!(approx_eq(geometry.height, 200.0));
        assert!(approx_eq(geometry.x, 100.0));
        assert!(approx_eq(geometry.y, 400.0));
    }

    #[test]
    fn test_fit_tall_image_scales_by_height() {
        // width fits, height 2000 > 400
        let geometry = ImageGeometry::fit_to_canvas(500, 2000, 1000.0, 500.0, 0.8).unwrap();
        assert!(approx_eq(geometry.height, 400.0));
        assert!(approx_eq(geometry.width, 100.0));
        assert!(approx_eq(geometry.x, 450.0));
        assert!(approx_eq(geometry.y, 50.0));
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        assert!(ImageGeometry::fit_to_canvas(0, 10, 100.0, 100.0, 0.8).is_err());
        assert!(ImageGeometry::fit_to_canvas(10, 10, 100.0, 100.0, 0.0).is_err());
        assert!(ImageGeometry::fit_to_canvas(10, 10, 100.0, 100.0, 1.5).is_err());
    }

    #[test]
    fn test_reversed_box() {
        let b = CanonicalBox {
            x: 0.0,
            y: 0.0,
            width: -1.0,
            height: 2.0,
            label: "a".into(),
        };
        assert!(b.is_reversed());
    }
}

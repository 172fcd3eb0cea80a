//! Box colors.
//!
//! Boxes are colored by their position in the decoded output, cycling
//! through a small fixed palette, so the same payload always renders with
//! the same colors.

use serde::{Serialize, Serializer};

use crate::constants::PALETTE_SIZE;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build from HSV.
    ///
    /// # Arguments
    /// * `h` - Hue in degrees (0-360)
    /// * `s` - Saturation (0.0-1.0)
    /// * `v` - Value/brightness (0.0-1.0)
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let (r, g, b) = hsv_to_rgb(h.rem_euclid(360.0), s, v);
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Fixed cycle of box colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// `count` fully saturated colors with evenly spaced hues, starting at red.
    pub fn evenly_spaced(count: usize) -> Self {
        let count = count.max(1);
        let step = 360.0 / count as f32;
        let colors = (0..count)
            .map(|i| Rgb::from_hsv(i as f32 * step, 0.85, 0.95))
            .collect();
        Self { colors }
    }

    /// Color for the box at `index` in the output.
    pub fn color_for(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    /// Number of colors in the cycle.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; a palette has at least one color.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::evenly_spaced(PALETTE_SIZE)
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

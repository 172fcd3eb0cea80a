//! rsmark - bounding boxes from loosely structured detection output
//!
//! Turns whatever an upstream vision model returned (clean JSON, JSON buried
//! in prose, truncated fragments, several record dialects) into boxes placed
//! over an image as it is displayed on a canvas.
//!
//! The decode pipeline lives in [`coords`]. [`overlay`] keeps the boxes in
//! sync with the displayed image, and [`config`] holds the user settings.

pub mod config;
pub mod constants;
pub mod coords;
pub mod error;
pub mod geometry;
pub mod message;
pub mod overlay;
pub mod palette;
pub mod refresh;
pub mod task;

pub use coords::{CornerPolicy, DecodeOptions, RawPayload, decode, decode_concatenated, decode_with};
pub use error::{Error, Result};
pub use geometry::{CanonicalBox, ImageGeometry};
pub use message::OverlayMessage;
pub use overlay::{DecodeTicket, Overlay};
pub use palette::{Palette, Rgb};
pub use refresh::{RefreshBus, RefreshEvent};
pub use task::{TaskType, canonical_payload, extract_object_coordinates};

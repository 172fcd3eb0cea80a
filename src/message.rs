//! Overlay message types.
//!
//! Everything that can change the boxes drawn over an image is represented as
//! a message, in the Elm architecture style, and applied with
//! [`Overlay::update`](crate::overlay::Overlay::update).

use crate::coords::RawPayload;
use crate::geometry::ImageGeometry;

/// Messages that can be sent to update overlay state.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayMessage {
    /// The displayed image moved or was rescaled; boxes follow it
    ImageLaidOut(ImageGeometry),
    /// A different image was uploaded; previous payloads are dropped
    ImageReplaced(ImageGeometry),
    /// A new payload replaces the current ones
    PayloadReceived(RawPayload),
    /// Another message's payload is shown alongside the current ones
    PayloadAppended(RawPayload),
    /// Remove all payloads and boxes, keeping the image
    Cleared,
}

//! Overlay state: the boxes currently drawn over the displayed image.
//!
//! The overlay owns the payloads received for the current image, re-decodes
//! them whenever the image moves, and tells subscribers through its
//! [`RefreshBus`] when the box set changed. Decoding can also happen off the
//! UI thread: take a [`DecodeTicket`], decode elsewhere, and hand the result
//! back with [`Overlay::apply`], which drops results for a superseded image
//! or payload set.

use std::sync::mpsc::Receiver;

use crate::coords::{DecodeOptions, RawPayload, decode_concatenated};
use crate::geometry::{CanonicalBox, ImageGeometry};
use crate::message::OverlayMessage;
use crate::refresh::{RefreshBus, RefreshEvent};

/// Snapshot of what a decode result must match to be accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeTicket {
    /// Image generation at the time the ticket was taken
    pub generation: u64,
    /// Payload revision at the time the ticket was taken
    pub revision: u64,
    /// Image placement the boxes must be computed for
    pub image: ImageGeometry,
}

/// Boxes over the displayed image, driven by [`OverlayMessage`]s.
#[derive(Debug, Default)]
pub struct Overlay {
    image: Option<ImageGeometry>,
    generation: u64,
    revision: u64,
    payloads: Vec<RawPayload>,
    boxes: Vec<CanonicalBox>,
    options: DecodeOptions,
    bus: RefreshBus,
}

impl Overlay {
    /// Create an empty overlay.
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Receive a [`RefreshEvent`] whenever the boxes change.
    pub fn subscribe(&mut self) -> Receiver<RefreshEvent> {
        self.bus.subscribe()
    }

    /// Current image placement, if an image is shown.
    pub fn image(&self) -> Option<&ImageGeometry> {
        self.image.as_ref()
    }

    /// Boxes to draw, in palette order.
    pub fn boxes(&self) -> &[CanonicalBox] {
        &self.boxes
    }

    /// Payloads the boxes are decoded from.
    pub fn payloads(&self) -> &[RawPayload] {
        &self.payloads
    }

    /// Generation of the displayed image; bumped on every replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Revision of the payload set; bumped whenever it changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a message. Returns `true` if the boxes changed.
    pub fn update(&mut self, message: OverlayMessage) -> bool {
        match message {
            OverlayMessage::ImageLaidOut(image) => {
                self.image = Some(image);
                self.recompute()
            }
            OverlayMessage::ImageReplaced(image) => {
                self.image = Some(image);
                self.generation += 1;
                self.revision += 1;
                self.payloads.clear();
                self.boxes.clear();
                log::debug!("Image replaced, generation {}", self.generation);
                self.bus.publish(RefreshEvent::ImageReplaced {
                    generation: self.generation,
                });
                true
            }
            OverlayMessage::PayloadReceived(payload) => {
                self.payloads = vec![payload];
                self.revision += 1;
                self.recompute()
            }
            OverlayMessage::PayloadAppended(payload) => {
                self.payloads.push(payload);
                self.revision += 1;
                self.recompute()
            }
            OverlayMessage::Cleared => {
                self.payloads.clear();
                self.revision += 1;
                self.set_boxes(Vec::new())
            }
        }
    }

    /// Ticket for decoding off this thread, or `None` without an image.
    pub fn ticket(&self) -> Option<DecodeTicket> {
        self.image.map(|image| DecodeTicket {
            generation: self.generation,
            revision: self.revision,
            image,
        })
    }

    /// Accept boxes decoded for `ticket`.
    ///
    /// Results for an older image generation, an outdated placement or a
    /// payload set that has since changed are discarded. Returns `true` if
    /// the boxes changed.
    pub fn apply(&mut self, ticket: DecodeTicket, boxes: Vec<CanonicalBox>) -> bool {
        if ticket.generation != self.generation
            || ticket.revision != self.revision
            || self.image != Some(ticket.image)
        {
            log::debug!(
                "Discarding {} stale boxes from generation {} revision {} (current {} {})",
                boxes.len(),
                ticket.generation,
                ticket.revision,
                self.generation,
                self.revision
            );
            return false;
        }
        self.set_boxes(boxes)
    }

    fn recompute(&mut self) -> bool {
        // Payloads that arrive before the image wait for it.
        let boxes = match &self.image {
            Some(image) => decode_concatenated(&self.payloads, image, &self.options),
            None => Vec::new(),
        };
        self.set_boxes(boxes)
    }

    fn set_boxes(&mut self, boxes: Vec<CanonicalBox>) -> bool {
        if boxes == self.boxes {
            return false;
        }
        self.boxes = boxes;
        self.bus.publish(RefreshEvent::BoxesChanged {
            generation: self.generation,
            count: self.boxes.len(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::decode_with;

    fn image(x: f64, width: f64) -> ImageGeometry {
        ImageGeometry::new(x, 0.0, width, 100.0).unwrap()
    }

    fn quad(text: &str) -> RawPayload {
        RawPayload::from(text)
    }

    #[test]
    fn test_payload_before_image_waits() {
        let mut overlay = Overlay::default();
        assert!(!overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 1, 1]"))));
        assert!(overlay.boxes().is_empty());

        assert!(overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0))));
        assert_eq!(overlay.boxes().len(), 1);
        assert!((overlay.boxes()[0].width - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_change_moves_boxes() {
        let mut overlay = Overlay::default();
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        overlay.update(OverlayMessage::PayloadReceived(quad("[0.5, 0, 1, 1]")));
        assert!((overlay.boxes()[0].x - 50.0).abs() < 1e-9);

        overlay.update(OverlayMessage::ImageLaidOut(image(10.0, 200.0)));
        assert!((overlay.boxes()[0].x - 110.0).abs() < 1e-9);
        assert_eq!(overlay.generation(), 0);
    }

    #[test]
    fn test_new_payload_replaces_appended_payload_concatenates() {
        let mut overlay = Overlay::default();
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 1, 1]")));
        overlay.update(OverlayMessage::PayloadAppended(quad("[0, 0, 0.5, 0.5]")));
        assert_eq!(overlay.boxes().len(), 2);
        assert_eq!(overlay.payloads().len(), 2);

        overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 0.2, 0.2]")));
        assert_eq!(overlay.boxes().len(), 1);
    }

    #[test]
    fn test_image_replacement_drops_boxes_and_notifies() {
        let mut overlay = Overlay::default();
        let rx = overlay.subscribe();
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 1, 1]")));
        assert_eq!(
            rx.try_recv().unwrap(),
            RefreshEvent::BoxesChanged {
                generation: 0,
                count: 1
            }
        );

        overlay.update(OverlayMessage::ImageReplaced(image(0.0, 50.0)));
        assert!(overlay.boxes().is_empty());
        assert!(overlay.payloads().is_empty());
        assert_eq!(overlay.generation(), 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            RefreshEvent::ImageReplaced { generation: 1 }
        );
    }

    #[test]
    fn test_unchanged_boxes_do_not_notify() {
        let mut overlay = Overlay::default();
        let rx = overlay.subscribe();
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        assert!(overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 1, 1]"))));
        assert!(!overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 1, 1]"))));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_cleared() {
        let mut overlay = Overlay::default();
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 1, 1]")));
        assert!(overlay.update(OverlayMessage::Cleared));
        assert!(overlay.boxes().is_empty());
        assert!(overlay.image().is_some());
    }

    #[test]
    fn test_off_thread_result_applied() {
        let mut overlay = Overlay::new(DecodeOptions::new().with_label_prefix("T"));
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        let ticket = overlay.ticket().unwrap();

        let options = DecodeOptions::new().with_label_prefix("T");
        let boxes = std::thread::spawn(move || {
            decode_with(&RawPayload::from("[0, 0, 1, 1]"), &ticket.image, &options)
        })
        .join()
        .unwrap();

        assert!(overlay.apply(ticket, boxes));
        assert_eq!(overlay.boxes()[0].label, "T 1");
    }

    #[test]
    fn test_stale_results_discarded() {
        let mut overlay = Overlay::default();
        assert!(overlay.ticket().is_none());

        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        let old_generation = overlay.ticket().unwrap();
        let boxes = decode_with(
            &RawPayload::from("[0, 0, 1, 1]"),
            &old_generation.image,
            &DecodeOptions::default(),
        );

        overlay.update(OverlayMessage::ImageReplaced(image(0.0, 100.0)));
        assert!(!overlay.apply(old_generation, boxes.clone()));
        assert!(overlay.boxes().is_empty());

        let old_layout = overlay.ticket().unwrap();
        overlay.update(OverlayMessage::ImageLaidOut(image(5.0, 100.0)));
        assert!(!overlay.apply(old_layout, boxes.clone()));

        let current = overlay.ticket().unwrap();
        assert!(overlay.apply(current, boxes));
        assert_eq!(overlay.boxes().len(), 1);
    }

    #[test]
    fn test_result_discarded_after_clear() {
        let mut overlay = Overlay::default();
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 1, 1]")));
        let ticket = overlay.ticket().unwrap();
        let boxes = decode_with(&quad("[0, 0, 1, 1]"), &ticket.image, &DecodeOptions::default());

        overlay.update(OverlayMessage::Cleared);
        assert!(!overlay.apply(ticket, boxes));
        assert!(overlay.payloads().is_empty());
        assert!(overlay.boxes().is_empty());
    }

    #[test]
    fn test_result_discarded_after_new_payload() {
        let mut overlay = Overlay::default();
        overlay.update(OverlayMessage::ImageLaidOut(image(0.0, 100.0)));
        let ticket = overlay.ticket().unwrap();
        let boxes = decode_with(&quad("[0, 0, 1, 1]"), &ticket.image, &DecodeOptions::default());

        overlay.update(OverlayMessage::PayloadReceived(quad("[0, 0, 0.5, 0.5]")));
        assert!(!overlay.apply(ticket, boxes.clone()));
        assert!((overlay.boxes()[0].width - 50.0).abs() < 1e-9);

        let ticket = overlay.ticket().unwrap();
        overlay.update(OverlayMessage::PayloadAppended(quad("[0, 0, 0.2, 0.2]")));
        assert!(!overlay.apply(ticket, boxes));
        assert_eq!(overlay.boxes().len(), 2);
        assert_eq!(overlay.revision(), 2);
    }
}

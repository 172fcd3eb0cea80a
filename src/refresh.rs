//! Publish/subscribe channel for canvas refresh notifications.
//!
//! Components that draw boxes subscribe once and receive a [`RefreshEvent`]
//! whenever the box set they show has changed. Nothing is global: whoever
//! owns the [`RefreshBus`] decides who hears about changes.

use std::sync::mpsc::{self, Receiver, Sender};

/// Notification that the overlay needs redrawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshEvent {
    /// The box set changed for the image of this generation
    BoxesChanged {
        /// Image generation the boxes belong to
        generation: u64,
        /// Number of boxes now shown
        count: usize,
    },
    /// A different image is displayed; previous boxes are gone
    ImageReplaced {
        /// Generation of the new image
        generation: u64,
    },
}

/// Fan-out of refresh events to any number of subscribers.
#[derive(Debug, Default)]
pub struct RefreshBus {
    subscribers: Vec<Sender<RefreshEvent>>,
}

impl RefreshBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    pub fn subscribe(&mut self) -> Receiver<RefreshEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Send `event` to every live subscriber.
    ///
    /// Subscribers whose receiver was dropped are removed. Returns the
    /// number of subscribers that got the event.
    pub fn publish(&mut self, event: RefreshEvent) -> usize {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
        log::trace!(
            "Published {:?} to {} subscribers",
            event,
            self.subscribers.len()
        );
        self.subscribers.len()
    }

    /// Number of registered subscribers, including ones not yet found dead.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

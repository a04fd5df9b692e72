//! Bounded queue of completed key events.
//!
//! The queue bridges the scan pipeline (producer, on tick boundaries) and
//! the register surface (consumer, on bus-access boundaries). A push into a
//! full queue is discarded, which preserves the press/release pairing of
//! everything already queued, and latches a sticky overflow indicator so
//! the loss stays observable until software acknowledges it.

use crate::event::KeyEvent;
use tinyvec::{ArrayVec, array_vec};

/// Capacity of the event queue.
pub const FIFO_DEPTH: usize = 16;

/// Bounded FIFO of [`KeyEvent`]s.
#[derive(Clone, Debug, Default)]
pub struct EventFifo {
    events: ArrayVec<[KeyEvent; FIFO_DEPTH]>,
    overflowed: bool,
}

impl EventFifo {
    /// Constructs an empty queue.
    pub fn new() -> Self {
        Self {
            events: array_vec!(),
            overflowed: false,
        }
    }

    /// Append an event. Returns `false` if the queue was full and the
    /// event was discarded.
    pub fn push(&mut self, event: KeyEvent) -> bool {
        if self.events.len() == self.events.capacity() {
            self.overflowed = true;
            return false;
        }
        self.events.push(event);
        true
    }

    /// Remove and return the oldest queued event.
    pub fn pop(&mut self) -> Option<KeyEvent> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.remove(0))
        }
    }

    /// Number of queued, unread events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// `true` iff no events are queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// `true` iff the queue is at capacity.
    pub fn is_full(&self) -> bool {
        self.events.len() == self.events.capacity()
    }

    /// Whether any event has been discarded since the indicator was last
    /// acknowledged.
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Clear the sticky overflow indicator.
    pub fn acknowledge_overflow(&mut self) {
        self.overflowed = false;
    }

    /// Discard all queued events and the overflow indicator.
    pub fn clear(&mut self) {
        self.events.clear();
        self.overflowed = false;
    }
}

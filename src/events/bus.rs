//! # Event bus shared by the dispatch layer and the coordinator.
//!
//! Thin wrapper around [`tokio::sync::broadcast`]. The dispatch layer
//! publishes [`EventKind::RequestFinished`](super::EventKind::RequestFinished)
//! here; the coordinator listener consumes it, runs the reset cycle, and
//! publishes the cycle's own events back for subscribers.
//!
//! ## Rules
//! - `publish()` never blocks (broadcast send).
//! - Bounded ring buffer; a lagging receiver observes `RecvError::Lagged(n)`
//!   and skips the `n` oldest items.
//! - Events are dropped when no receiver is attached; nothing persists.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for reset-cycle events.
///
/// Cheap to clone (the sender is `Arc`-backed internally); multiple
/// publishers may publish concurrently.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// New bus with the given ring-buffer capacity (clamped to at least 1).
    ///
    /// A worker serves one request at a time, so at most one
    /// `RequestFinished` is ever outstanding; capacity mainly buffers the
    /// cycle's own events for slow subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; dropped when none exist.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New independent receiver observing only subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

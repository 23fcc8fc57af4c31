//! # Core subscriber trait
//!
//! [`Subscribe`] is the extension point for observing the reset cycle
//! (logging, metrics, audit). Each subscriber is driven by a dedicated
//! worker loop fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) — they never block the
//!   coordinator nor other subscribers.
//! - Each subscriber declares its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. On overflow, events for that subscriber
//!   are dropped and reported on the bus.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for reset-cycle observers.
///
/// Called from a subscriber-dedicated worker task; prefer async I/O and
/// cooperative waits over blocking the runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}

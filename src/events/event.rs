//! # Events emitted around the reset cycle.
//!
//! [`EventKind`] classifies three groups:
//! - **Input signals**: the dispatch layer announces request completion;
//! - **Reset-cycle events**: individual cleaners, provider re-registration,
//!   controller detachment, cycle completion;
//! - **Plumbing events**: subscriber panics/overflow, worker shutdown.
//!
//! Every event carries a wall-clock timestamp and a globally monotonic
//! sequence number (`seq`) so ordering can be reconstructed even when
//! subscribers consume out of band.
//!
//! ## Example
//! ```rust
//! use snapback::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ProviderSkipped)
//!     .with_binding("App\\Providers\\GhostProvider")
//!     .with_detail("not loadable");
//!
//! assert_eq!(ev.kind, EventKind::ProviderSkipped);
//! assert_eq!(ev.binding.as_deref(), Some("App\\Providers\\GhostProvider"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of reset-cycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Input signals ===
    /// A request finished; the worker is about to become available again.
    /// Published by the dispatch layer, consumed by the coordinator
    /// listener. No payload.
    RequestFinished,

    // === Reset cycle ===
    /// One registered cleaner ran.
    ///
    /// Sets: `binding` (cleaner binding key).
    CleanerRan,

    /// A configured provider was re-registered into the current container.
    ///
    /// Sets: `binding` (provider identifier).
    ProviderReregistered,

    /// A configured provider identifier was not loadable and was skipped.
    ///
    /// Sets: `binding` (provider identifier), `detail` (reason).
    ProviderSkipped,

    /// A resolved controller instance was detached from the current route.
    ///
    /// Sets: `binding` (controller class), `detail` (`"public"` or
    /// `"hidden"` slot).
    ControllerDetached,

    /// The full reset cycle (clean → providers → controllers) completed.
    ResetCompleted,

    // === Plumbing ===
    /// The coordinator listener is stopping (token cancelled or bus closed).
    ShutdownRequested,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `binding` (subscriber name), `detail` (panic info).
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker gone).
    ///
    /// Sets: `binding` (subscriber name), `detail` (reason).
    SubscriberOverflow,
}

impl EventKind {
    /// Short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::RequestFinished => "request_finished",
            EventKind::CleanerRan => "cleaner_ran",
            EventKind::ProviderReregistered => "provider_reregistered",
            EventKind::ProviderSkipped => "provider_skipped",
            EventKind::ControllerDetached => "controller_detached",
            EventKind::ResetCompleted => "reset_completed",
            EventKind::ShutdownRequested => "shutdown_requested",
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
        }
    }
}

/// A single reset-cycle event.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event classification.
    pub kind: EventKind,
    /// The binding/identifier/class this event is about, if any.
    pub binding: Option<String>,
    /// Free-form detail (skip reason, slot kind, panic info).
    pub detail: Option<String>,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Globally monotonic sequence number.
    pub seq: u64,
}

impl Event {
    /// New event stamped with the current time and the next sequence
    /// number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            kind,
            binding: None,
            detail: None,
            at: SystemTime::now(),
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
        }
    }

    /// Sets the binding/identifier this event is about.
    pub fn with_binding(mut self, binding: &str) -> Self {
        self.binding = Some(binding.to_string());
        self
    }

    /// Sets the free-form detail.
    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

//! # Reset-cycle observers.
//!
//! The coordinator listener fans every [`Event`](crate::events::Event) out to
//! the subscribers attached at build time.
//!
//! ```text
//! Event flow:
//!   dispatch / coordinator ── publish(Event) ──► Bus ──► coordinator listener
//!                                                             │
//!                                                             ▼
//!                                                   SubscriberSet::emit(&Event)
//!                                                   ┌─────────┼─────────┐
//!                                                   ▼         ▼         ▼
//!                                               LogWriter   Metrics   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use snapback::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct LeakAlarm;
//!
//! #[async_trait]
//! impl Subscribe for LeakAlarm {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ControllerDetached {
//!             // a controller held request-scoped state past the request
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;

//! Event spine of the reset cycle.
//!
//! Internal modules:
//! - [`bus`]: broadcast channel between the dispatch layer, the coordinator
//!   listener, and subscribers;
//! - [`event`]: event struct and classification.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

//! Coordinator core: the post-request reset cycle.
//!
//! The public API from this module is [`Coordinator`] (built through
//! [`CoordinatorBuilder`]) plus the [`ControllerWhitelist`] it consults.
//!
//! Internal modules:
//! - [`coordinator`]: the three reset operations and the per-request cycle;
//! - [`builder`]: construction-time validation (cleaner contract, white
//!   list, register-arity probe);
//! - [`whitelist`]: controller exclusion rules;
//! - [`hook`]: the listener bridging the dispatch loop to the cycle.

mod builder;
mod coordinator;
mod hook;
mod whitelist;

pub use builder::CoordinatorBuilder;
pub use coordinator::Coordinator;
pub use whitelist::{ControllerWhitelist, WILDCARD};

//! # Core cleaner trait
//!
//! [`Cleaner`] is the capability every reset unit implements: one
//! parameterless, returnless `clean()` whose side effects are scoped to
//! exactly one category of mutable state.
//!
//! ## Contract
//! - **Idempotent**: running with nothing to clean is a safe no-op.
//! - **Never panics for "nothing to do"**: absence of the state it owns is
//!   success, not an error.
//! - **Synchronous**: the reset cycle is pure in-memory mutation inside the
//!   request-completion hook; nothing here blocks or awaits.
//!
//! Cleaners are constructed from the current and snapshot container handles
//! (borrowed logically — both containers outlive every cleaner) and cached
//! as singletons in the current container under their binding key.

use std::sync::Arc;

/// Contract for a single-category state reset unit.
pub trait Cleaner: Send + Sync + 'static {
    /// Discards this category's request-scoped mutations, copying
    /// replacement values from the snapshot container where needed.
    fn clean(&self);

    /// Human-readable name (for events/logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Concrete wrapper a cleaner is stored under in the container.
///
/// Container services are type-erased; wrapping the trait object in this
/// newtype lets the builder check a binding against the cleaner contract
/// with a single downcast at startup. A binding under a cleaner key that is
/// not a `CleanerHandle` fails construction.
pub struct CleanerHandle(pub Arc<dyn Cleaner>);

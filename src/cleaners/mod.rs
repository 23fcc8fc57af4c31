//! # The cleaner family.
//!
//! Independent, composable reset units, one per category of mutable state.
//! The coordinator invokes them in registration order after every request;
//! extension cleaners configured by the caller run **before** the four
//! built-ins so they may observe state the base cleaners are about to reset.
//!
//! Built-in order:
//! 1. [`ContainerCleaner`] — request-scoped bindings, reseeded services;
//! 2. [`ConfigCleaner`] — configuration mapping;
//! 3. [`CookieCleaner`] — queued cookies;
//! 4. [`RequestCleaner`] — bound request object.

mod cleaner;
mod config;
mod container;
mod cookie;
mod request;

pub use cleaner::{Cleaner, CleanerHandle};
pub use config::ConfigCleaner;
pub use container::ContainerCleaner;
pub use cookie::CookieCleaner;
pub use request::RequestCleaner;

/// Binding key of the built-in container-state cleaner.
pub const CONTAINER_CLEANER: &str = "cleaner.container";
/// Binding key of the built-in configuration cleaner.
pub const CONFIG_CLEANER: &str = "cleaner.config";
/// Binding key of the built-in cookie cleaner.
pub const COOKIE_CLEANER: &str = "cleaner.cookie";
/// Binding key of the built-in request-object cleaner.
pub const REQUEST_CLEANER: &str = "cleaner.request";

/// Built-in cleaner keys in invocation order (after extensions).
pub(crate) const BUILT_IN: [&str; 4] = [
    CONTAINER_CLEANER,
    CONFIG_CLEANER,
    COOKIE_CLEANER,
    REQUEST_CLEANER,
];

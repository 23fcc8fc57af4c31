//! Framework collaborators: the service container pair the coordinator
//! resets, the per-request services the cleaner family operates on, and the
//! provider/registration surface.
//!
//! The dispatch/runtime layer and the framework itself stay outside this
//! crate; this module is the concrete model of exactly the interfaces the
//! reset cycle needs (`make`/`singleton`, the router binding, the
//! version-dependent provider-registration entry point, the loaded-provider
//! list).
//!
//! Internal modules:
//! - [`container`]: the mutable registry plus the snapshot operation;
//! - [`services`]: config repository, cookie queue, request object, router;
//! - [`provider`]: provider contract and the loadable-provider registry;
//! - [`probe`]: one-time registration-arity detection.

mod container;
mod probe;
pub(crate) mod provider;
mod services;

pub use container::{Container, FactoryFn, ServiceRef, DEFAULT_REGISTER_ARITY};
pub use probe::{AppProbe, RegisterShape};
pub use provider::{ProviderFactory, ProviderRegistry, ServiceProvider};
pub use services::{
    BoundController, ConfigRepository, CookieJar, QueuedCookie, Request, Route, Router, CONFIG,
    COOKIE, REQUEST, ROUTER,
};

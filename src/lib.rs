//! # snapback
//!
//! **Snapback** keeps a "bootstrap once, discard on exit" web framework
//! healthy inside a long-lived worker process: after every request it
//! restores the framework's service container toward a pristine post-boot
//! snapshot, so configuration, bound services, queued cookies, the request
//! object and resolved controllers from request *N* never leak into request
//! *N+1*.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────┐    boots, then snapshots     ┌────────────────┐
//!   │    Container   │ ───────────────────────────► │    Container   │
//!   │    (current)   │                              │   (snapshot)   │
//!   └───────┬────────┘                              └───────┬────────┘
//!           │  mutated per request                          │  frozen, read-only
//!           ▼                                               ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Coordinator (reset-cycle orchestrator)                             │
//! │  - cleaner table (extensions first, then four built-ins)            │
//! │  - ProviderRegistry + AppProbe (pinned register shape)              │
//! │  - ControllerWhitelist (exact names + prefixes)                     │
//! │  - Bus (broadcast events) + SubscriberSet (fan-out to observers)    │
//! └───────┬──────────────┬──────────────┬──────────────────────┬────────┘
//!         ▼              ▼              ▼                      ▼
//!   ContainerCleaner ConfigCleaner CookieCleaner        RequestCleaner
//!     (scoped bindings, (config map)  (queued cookies)  (bound request)
//!      reseeded services)
//! ```
//!
//! ### Request cycle
//! ```text
//! dispatch loop ── publish(RequestFinished) ──► Bus ──► Coordinator listener
//!
//! on_request_done() {
//!   ├─► clean()               each registered cleaner, registration order,
//!   │                         exactly once; each diffs/copies from the
//!   │                         snapshot container into the current one
//!   ├─► clean_providers()     per-request providers re-registered through
//!   │                         the startup-pinned register shape; unknown
//!   │                         identifiers soft-skipped; slim flavor prunes
//!   │                         and persists the tracked provider list
//!   └─► clean_controllers()   resolved controller detached from the current
//!                             route unless white-listed (public slot first,
//!                             hidden-slot escape hatch for the older line)
//! }
//! ──► publish(ResetCompleted) ──► subscribers
//! ```
//!
//! One worker serves one request at a time; the cycle runs strictly between
//! requests, synchronously, with no I/O. Each worker owns a private
//! container pair, so no cross-worker synchronization exists anywhere in
//! this crate. Misconfiguration (an unbound or non-conforming cleaner, an
//! unrecognized register arity) fails at build time — a worker never serves
//! with a broken reset pipeline.
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                       |
//! |-------------------|----------------------------------------------------------|------------------------------------------|
//! | **Containers**    | Service registry pair with an explicit snapshot.         | [`Container`]                            |
//! | **Cleaners**      | Composable single-category reset units.                  | [`Cleaner`], [`CleanerHandle`]           |
//! | **Coordination**  | The post-request reset cycle.                            | [`Coordinator`], [`CoordinatorBuilder`]  |
//! | **Providers**     | Per-request provider re-registration.                    | [`ServiceProvider`], [`ProviderRegistry`]|
//! | **Controllers**   | Route/controller detachment with exclusions.             | [`ControllerWhitelist`]                  |
//! | **Observability** | Reset-cycle events fanned out to observers.              | [`Subscribe`], [`Event`], [`EventKind`]  |
//! | **Errors**        | Fatal startup configuration errors.                      | [`SetupError`]                           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use snapback::{
//!     Config, ConfigRepository, Container, Coordinator, CookieJar, Router,
//!     ServiceRef, CONFIG, COOKIE, ROUTER,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Boot the framework container once, per worker.
//! let current = Container::new();
//! current.singleton(CONFIG, |_| {
//!     Arc::new(ConfigRepository::seeded([("app.name", "demo")])) as ServiceRef
//! });
//! current.singleton(COOKIE, |_| Arc::new(CookieJar::new()) as ServiceRef);
//! current.singleton(ROUTER, |_| Arc::new(Router::new()) as ServiceRef);
//! current.make(CONFIG);
//! current.make(COOKIE);
//! current.make(ROUTER);
//!
//! // Freeze the post-boot state before the first request.
//! let snapshot = current.snapshot();
//!
//! let coordinator = Coordinator::builder(Config::default(), current, snapshot).build()?;
//!
//! // ... per request, in the completion hook:
//! coordinator.on_request_done();
//! # Ok(())
//! # }
//! ```

mod app;
mod cleaners;
mod config;
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use app::{
    AppProbe, BoundController, ConfigRepository, Container, CookieJar, FactoryFn,
    ProviderFactory, ProviderRegistry, QueuedCookie, RegisterShape, Request, Route, Router,
    ServiceProvider, ServiceRef, CONFIG, COOKIE, DEFAULT_REGISTER_ARITY, REQUEST, ROUTER,
};
pub use cleaners::{
    Cleaner, CleanerHandle, ConfigCleaner, ContainerCleaner, CookieCleaner, RequestCleaner,
    CONFIG_CLEANER, CONTAINER_CLEANER, COOKIE_CLEANER, REQUEST_CLEANER,
};
pub use config::{Config, DestroyControllers, Flavor};
pub use crate::core::{ControllerWhitelist, Coordinator, CoordinatorBuilder, WILDCARD};
pub use error::SetupError;
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

//! # Coordinator configuration.
//!
//! [`Config`] is consumed once, at [`Coordinator`](crate::Coordinator)
//! construction. It controls which extension cleaners run (and before the
//! built-ins), which providers are re-registered after every request, whether
//! resolved controller instances are detached from the current route, and the
//! framework flavor the worker hosts.
//!
//! ## Sentinel behavior
//! - `cleaners = []` → only the four built-in cleaners run.
//! - `register_providers = []` → [`clean_providers`](crate::Coordinator::clean_providers)
//!   is a no-op.
//! - `destroy_controllers.enable = false` → controller cleanup is disabled
//!   regardless of route state.

/// Framework flavor hosted by the worker.
///
/// The slim framework line tracks its loaded providers in a serializable
/// list (so intentional re-registration must prune that list first) and does
/// not expose a route/controller surface the coordinator could clean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flavor {
    /// Full framework line: controller cleanup is available, providers are
    /// not tracked in a serializable list.
    #[default]
    Full,
    /// Slim framework line: loaded providers are tracked in a serializable
    /// list; controller cleanup is unsupported.
    Slim,
}

impl Flavor {
    /// Whether the framework keeps its loaded providers in a serializable
    /// list the coordinator must prune and persist around re-registration.
    #[inline]
    pub fn tracks_loaded_providers(&self) -> bool {
        matches!(self, Flavor::Slim)
    }

    /// Whether the framework exposes a route/controller surface that
    /// supports controller cleanup.
    #[inline]
    pub fn supports_controller_cleanup(&self) -> bool {
        matches!(self, Flavor::Full)
    }
}

/// Controller-destroy settings.
#[derive(Clone, Debug, Default)]
pub struct DestroyControllers {
    /// When false, [`clean_controllers`](crate::Coordinator::clean_controllers)
    /// performs no mutation regardless of route state.
    pub enable: bool,
    /// Controller classes excluded from cleanup. Entries ending in `*` are
    /// prefix rules; all others are exact class names.
    pub excluded_list: Vec<String>,
}

/// Configuration for the snapshot/restore coordinator.
///
/// Plain data; all fields are public. The builder validates everything that
/// can fail (cleaner bindings, register arity) at construction time.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Binding keys of extension cleaners, run **before** the built-ins so
    /// they may observe state the base cleaners are about to reset. The
    /// caller must have bound each key in the current container. Duplicates
    /// (including duplicates of built-in keys) are removed, first occurrence
    /// wins.
    pub cleaners: Vec<String>,

    /// Provider identifiers re-registered into the current container after
    /// every request. Identifiers with no loadable provider are skipped,
    /// never fatal.
    pub register_providers: Vec<String>,

    /// Controller-destroy toggle and white list.
    pub destroy_controllers: DestroyControllers,

    /// Framework flavor hosted by this worker.
    pub flavor: Flavor,
}

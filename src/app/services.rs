//! # Framework services the cleaner family operates on.
//!
//! These are the per-request mutable services the hosted framework keeps in
//! its container: configuration repository, cookie queue, the bound request
//! object, and the router with its current route. Each is a plain struct with
//! `std` interior mutability — the reset cycle is synchronous and never
//! crosses an await point while holding a lock.
//!
//! ## Controller slots
//! The hosted framework changed where a route stores its resolved controller
//! instance across minor versions: the newer line exposes a public slot, the
//! older line hides it behind a non-public field. [`Route`] models both; the
//! hidden slot is reachable only through `pub(crate)` accessors so the
//! escape hatch stays isolated in the coordinator's controller-cleanup path.

use std::sync::{Arc, PoisonError, RwLock};

use super::container::ServiceRef;

/// Binding key of the configuration repository.
pub const CONFIG: &str = "config";
/// Binding key of the cookie queue.
pub const COOKIE: &str = "cookie";
/// Binding key of the bound request object.
pub const REQUEST: &str = "request";
/// Binding key of the router.
pub const ROUTER: &str = "router";

fn recovered<'a, T>(lock: &'a RwLock<T>) -> std::sync::RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn recovered_read<'a, T>(lock: &'a RwLock<T>) -> std::sync::RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Key/value configuration repository with runtime mutation.
#[derive(Default)]
pub struct ConfigRepository {
    values: RwLock<std::collections::HashMap<String, String>>,
}

impl ConfigRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded from `(key, value)` pairs.
    pub fn seeded<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let repo = Self::new();
        let mut values = recovered(&repo.values);
        for (k, v) in pairs {
            values.insert(k.into(), v.into());
        }
        drop(values);
        repo
    }

    /// Value for `key`, if set.
    pub fn get(&self, key: &str) -> Option<String> {
        recovered_read(&self.values).get(key).cloned()
    }

    /// Sets `key` to `value` (runtime mutation; undone by the config
    /// cleaner).
    pub fn set(&self, key: &str, value: &str) {
        recovered(&self.values).insert(key.to_string(), value.to_string());
    }

    /// The full mapping.
    pub fn all(&self) -> std::collections::HashMap<String, String> {
        recovered_read(&self.values).clone()
    }

    /// Replaces the full mapping.
    pub fn replace(&self, values: std::collections::HashMap<String, String>) {
        *recovered(&self.values) = values;
    }
}

/// A cookie queued during the request, waiting to be attached to the
/// response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
}

/// Request-scoped cookie queue.
#[derive(Default)]
pub struct CookieJar {
    queued: RwLock<Vec<QueuedCookie>>,
}

impl CookieJar {
    /// Empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a cookie for the in-flight request.
    pub fn queue(&self, name: &str, value: &str) {
        recovered(&self.queued).push(QueuedCookie {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    /// Cookies queued so far.
    pub fn queued(&self) -> Vec<QueuedCookie> {
        recovered_read(&self.queued).clone()
    }

    /// Drops all queued cookies. Safe no-op when empty.
    pub fn flush_queued(&self) {
        recovered(&self.queued).clear();
    }
}

/// The request object bound into the container for the in-flight request.
#[derive(Clone, Debug)]
pub struct Request {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
}

impl Request {
    /// New request object.
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
        }
    }
}

/// A controller instance resolved for a route during request handling.
#[derive(Clone)]
pub struct BoundController {
    /// Fully-qualified controller class name.
    pub class: String,
    /// The resolved instance (type-erased, may hold request-scoped data).
    pub instance: ServiceRef,
}

impl BoundController {
    /// Binds `instance` under the fully-qualified `class` name.
    pub fn new(class: &str, instance: ServiceRef) -> Self {
        Self {
            class: class.to_string(),
            instance,
        }
    }
}

/// A matched route, carrying (at most) one resolved controller instance.
pub struct Route {
    pattern: String,
    /// Whether this route exposes its controller slot publicly (newer
    /// framework line) or hides it (older line).
    exposed: bool,
    controller: RwLock<Option<BoundController>>,
}

impl Route {
    /// Route from the framework line with a publicly accessible controller
    /// slot.
    pub fn with_exposed_controller(pattern: &str, controller: Option<BoundController>) -> Self {
        Self {
            pattern: pattern.to_string(),
            exposed: true,
            controller: RwLock::new(controller),
        }
    }

    /// Route from the older framework line that keeps its controller behind
    /// a non-public field.
    pub fn with_hidden_controller(pattern: &str, controller: Option<BoundController>) -> Self {
        Self {
            pattern: pattern.to_string(),
            exposed: false,
            controller: RwLock::new(controller),
        }
    }

    /// Route pattern this route was matched for.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the controller slot is publicly accessible.
    pub fn exposes_controller(&self) -> bool {
        self.exposed
    }

    /// The public controller slot. `None` when empty **or** when this route
    /// is from the line that hides the slot.
    pub fn controller(&self) -> Option<BoundController> {
        if !self.exposed {
            return None;
        }
        recovered_read(&self.controller).clone()
    }

    /// Detaches the public controller slot so the instance becomes eligible
    /// for release. Safe no-op when already empty.
    pub fn detach_controller(&self) {
        if self.exposed {
            *recovered(&self.controller) = None;
        }
    }

    /// Attaches a controller instance (done by the dispatch layer when the
    /// route is matched).
    pub fn attach_controller(&self, controller: BoundController) {
        *recovered(&self.controller) = Some(controller);
    }

    // Escape hatch for the older framework line: reads/clears the hidden
    // slot. Only the coordinator's controller-cleanup path calls these.

    pub(crate) fn hidden_controller(&self) -> Option<BoundController> {
        if self.exposed {
            return None;
        }
        recovered_read(&self.controller).clone()
    }

    pub(crate) fn clear_hidden_controller(&self) {
        if !self.exposed {
            *recovered(&self.controller) = None;
        }
    }
}

/// Router service: owns the currently matched route, if any.
#[derive(Default)]
pub struct Router {
    current: RwLock<Option<Arc<Route>>>,
}

impl Router {
    /// Router with no current route.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently matched route.
    pub fn current(&self) -> Option<Arc<Route>> {
        recovered_read(&self.current).clone()
    }

    /// Sets the currently matched route (dispatch layer).
    pub fn set_current(&self, route: Arc<Route>) {
        *recovered(&self.current) = Some(route);
    }

    /// Clears the current route (e.g. between requests in tests).
    pub fn clear_current(&self) {
        *recovered(&self.current) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_repository_set_get_replace() {
        let cfg = ConfigRepository::seeded([("app.name", "demo")]);
        assert_eq!(cfg.get("app.name").as_deref(), Some("demo"));

        cfg.set("app.debug", "true");
        assert_eq!(cfg.all().len(), 2);

        cfg.replace(ConfigRepository::seeded([("app.name", "demo")]).all());
        assert_eq!(cfg.get("app.debug"), None);
    }

    #[test]
    fn cookie_jar_flush_is_idempotent() {
        let jar = CookieJar::new();
        jar.queue("session", "abc");
        assert_eq!(jar.queued().len(), 1);
        jar.flush_queued();
        jar.flush_queued();
        assert!(jar.queued().is_empty());
    }

    #[test]
    fn hidden_route_never_exposes_controller_publicly() {
        let ctrl = BoundController::new("App\\Http\\PageController", Arc::new(()));
        let route = Route::with_hidden_controller("/pages/{id}", Some(ctrl));
        assert!(!route.exposes_controller());
        assert!(route.controller().is_none());
        assert!(route.hidden_controller().is_some());

        route.clear_hidden_controller();
        assert!(route.hidden_controller().is_none());
    }
}

//! # Service container model.
//!
//! [`Container`] is the concrete rendering of the framework DI container this
//! crate coordinates: a mutable mapping from binding key to a factory or a
//! resolved service instance, plus the bookkeeping the reset cycle needs
//! (resolved flags, request-scoped keys, reseed keys, the tracked
//! loaded-provider list of the slim framework line).
//!
//! Two containers exist per worker:
//! - **current** — mutated freely by the in-flight request;
//! - **snapshot** — produced once by [`Container::snapshot`] immediately
//!   after boot, before the first request, and never mutated afterwards.
//!
//! ## Rules
//! - Services are stored type-erased (`Arc<dyn Any + Send + Sync>`); typed
//!   access goes through [`Container::make_as`].
//! - `make` resolves through the factory and caches the instance for shared
//!   bindings; factories run without any container lock held, so a factory
//!   may itself call back into the container.
//! - [`Container::snapshot`] re-resolves every shared service from its
//!   factory, so later mutation of the current container's services cannot
//!   reach the snapshot. Services registered directly via
//!   [`Container::instance`] (no factory) are Arc-shared and treated as
//!   immutable.
//! - The provider-registration entry point exists in three arities (the
//!   hosted framework shipped incompatible signatures across versions); the
//!   arity a given container instance expects is fixed at construction and
//!   reported by [`Container::register_method_arity`].

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::provider::ServiceProvider;

/// Type-erased handle to a resolved service.
pub type ServiceRef = Arc<dyn Any + Send + Sync>;

/// Service factory stored under a binding key.
pub type FactoryFn = Arc<dyn Fn(&Container) -> ServiceRef + Send + Sync>;

/// Default registration arity when none is given (the single-argument shape).
pub const DEFAULT_REGISTER_ARITY: usize = 1;

#[derive(Clone)]
struct BindingEntry {
    factory: FactoryFn,
    shared: bool,
}

/// Mutable service registry with an explicit snapshot operation.
pub struct Container {
    bindings: RwLock<HashMap<String, BindingEntry>>,
    instances: RwLock<HashMap<String, ServiceRef>>,
    resolved: RwLock<HashSet<String>>,
    scoped: RwLock<HashSet<String>>,
    reseed: RwLock<HashSet<String>>,
    loaded_providers: RwLock<Vec<String>>,
    register_arity: usize,
}

// Poisoning only occurs if a writer panicked; the maps stay structurally
// sound, so recover the guard instead of propagating the panic.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Container {
    /// Creates an empty container with the default registration arity.
    pub fn new() -> Arc<Self> {
        Self::with_register_arity(DEFAULT_REGISTER_ARITY)
    }

    /// Creates an empty container whose provider-registration entry point
    /// expects `arity` positional arguments (simulates the hosted framework
    /// version).
    pub fn with_register_arity(arity: usize) -> Arc<Self> {
        Arc::new(Self {
            bindings: RwLock::new(HashMap::new()),
            instances: RwLock::new(HashMap::new()),
            resolved: RwLock::new(HashSet::new()),
            scoped: RwLock::new(HashSet::new()),
            reseed: RwLock::new(HashSet::new()),
            loaded_providers: RwLock::new(Vec::new()),
            register_arity: arity,
        })
    }

    // ---------------------------
    // Binding & resolution
    // ---------------------------

    /// Registers a non-shared factory: every `make` runs the factory again.
    pub fn bind<F>(&self, key: &str, factory: F)
    where
        F: Fn(&Container) -> ServiceRef + Send + Sync + 'static,
    {
        self.put_binding(key, Arc::new(factory), false);
    }

    /// Registers a shared factory: the first `make` caches the instance for
    /// the worker's lifetime.
    pub fn singleton<F>(&self, key: &str, factory: F)
    where
        F: Fn(&Container) -> ServiceRef + Send + Sync + 'static,
    {
        self.put_binding(key, Arc::new(factory), true);
    }

    /// Registers a shared factory whose instance is request-scoped: it is
    /// dropped (with its resolved flag) by [`Container::flush_scoped`] so the
    /// next request re-resolves it fresh.
    pub fn scoped<F>(&self, key: &str, factory: F)
    where
        F: Fn(&Container) -> ServiceRef + Send + Sync + 'static,
    {
        self.put_binding(key, Arc::new(factory), true);
        write(&self.scoped).insert(key.to_string());
    }

    fn put_binding(&self, key: &str, factory: FactoryFn, shared: bool) {
        write(&self.bindings).insert(key.to_string(), BindingEntry { factory, shared });
    }

    /// Stores an already-built instance under `key`, marking it resolved.
    pub fn instance(&self, key: &str, service: ServiceRef) {
        write(&self.instances).insert(key.to_string(), service);
        write(&self.resolved).insert(key.to_string());
    }

    /// Resolves `key` to a service: cached instance first, then factory.
    ///
    /// Returns `None` when the key has neither an instance nor a binding.
    pub fn make(&self, key: &str) -> Option<ServiceRef> {
        if let Some(svc) = read(&self.instances).get(key) {
            return Some(svc.clone());
        }
        let entry = read(&self.bindings).get(key).cloned()?;
        let svc = (entry.factory)(self);
        if entry.shared {
            write(&self.instances).insert(key.to_string(), svc.clone());
            write(&self.resolved).insert(key.to_string());
        }
        Some(svc)
    }

    /// Resolves `key` and downcasts to the concrete service type.
    ///
    /// `None` if the key is unbound **or** holds a different type.
    pub fn make_as<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.make(key)?.downcast::<T>().ok()
    }

    /// Returns the cached instance for `key` without running any factory.
    pub fn raw_instance(&self, key: &str) -> Option<ServiceRef> {
        read(&self.instances).get(key).cloned()
    }

    /// Whether `key` currently holds a resolved instance.
    pub fn is_resolved(&self, key: &str) -> bool {
        read(&self.resolved).contains(key)
    }

    /// Drops the cached instance and resolved flag for `key`, keeping the
    /// binding so the next `make` re-resolves. Safe no-op for unknown keys.
    pub fn forget_instance(&self, key: &str) {
        write(&self.instances).remove(key);
        write(&self.resolved).remove(key);
    }

    // ---------------------------
    // Request-scoped bookkeeping
    // ---------------------------

    /// Drops every request-scoped instance and its resolved flag.
    pub fn flush_scoped(&self) {
        let keys: Vec<String> = read(&self.scoped).iter().cloned().collect();
        for key in keys {
            self.forget_instance(&key);
        }
    }

    /// Marks `key` for re-seeding: the container cleaner copies the snapshot
    /// instance for this key back into the current container each cycle.
    pub fn mark_reseed(&self, key: &str) {
        write(&self.reseed).insert(key.to_string());
    }

    /// Keys marked for re-seeding from the snapshot.
    pub fn reseed_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = read(&self.reseed).iter().cloned().collect();
        keys.sort_unstable();
        keys
    }

    // ---------------------------
    // Provider registration (version-dependent entry points)
    // ---------------------------

    /// Arity of the provider-registration entry point this container
    /// expects. Inspected once at startup by
    /// [`AppProbe`](crate::AppProbe).
    #[inline]
    pub fn register_method_arity(&self) -> usize {
        self.register_arity
    }

    /// Single-argument registration shape.
    ///
    /// Guarded: a provider already present in the loaded list is a no-op.
    pub fn register(&self, provider: &dyn ServiceProvider) {
        self.register_inner(provider, false);
    }

    /// Two-argument shape: `force = true` bypasses the duplicate guard.
    pub fn register_force(&self, provider: &dyn ServiceProvider, force: bool) {
        self.register_inner(provider, force);
    }

    /// Three-argument shape: options plus force flag. Options are accepted
    /// for signature fidelity; this model does not interpret them.
    pub fn register_with_options(
        &self,
        provider: &dyn ServiceProvider,
        _options: &[(&str, &str)],
        force: bool,
    ) {
        self.register_inner(provider, force);
    }

    fn register_inner(&self, provider: &dyn ServiceProvider, force: bool) {
        let name = provider.name().to_string();
        if !force && read(&self.loaded_providers).iter().any(|n| *n == name) {
            return;
        }
        provider.register(self);
        let mut loaded = write(&self.loaded_providers);
        if !loaded.iter().any(|n| *n == name) {
            loaded.push(name);
        }
    }

    /// The tracked loaded-provider list (slim framework line).
    pub fn loaded_providers(&self) -> Vec<String> {
        read(&self.loaded_providers).clone()
    }

    /// Overwrites the tracked loaded-provider list.
    pub fn set_loaded_providers(&self, providers: Vec<String>) {
        *write(&self.loaded_providers) = providers;
    }

    // ---------------------------
    // Snapshot
    // ---------------------------

    /// Produces the frozen post-boot container.
    ///
    /// Bindings, scoped/reseed key sets, the loaded-provider list and the
    /// register arity are copied. Every service resolved in `self` is then
    /// re-resolved **fresh** in the snapshot from its own factory, so the two
    /// containers share no mutable service state. Instances without a
    /// factory are Arc-shared (treated as immutable).
    ///
    /// Must be called once, after boot, before the first request is served.
    pub fn snapshot(&self) -> Arc<Container> {
        let snap = Arc::new(Container {
            bindings: RwLock::new(read(&self.bindings).clone()),
            instances: RwLock::new(HashMap::new()),
            resolved: RwLock::new(HashSet::new()),
            scoped: RwLock::new(read(&self.scoped).clone()),
            reseed: RwLock::new(read(&self.reseed).clone()),
            loaded_providers: RwLock::new(read(&self.loaded_providers).clone()),
            register_arity: self.register_arity,
        });

        let resolved: Vec<String> = read(&self.resolved).iter().cloned().collect();
        for key in resolved {
            if snap.make(&key).is_none() {
                // Instance registered without a binding: share the Arc.
                if let Some(svc) = self.raw_instance(&key) {
                    snap.instance(&key, svc);
                }
            }
        }
        snap
    }
}

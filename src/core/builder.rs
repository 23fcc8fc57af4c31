//! # Builder: assembles and validates a coordinator.
//!
//! Everything that can be misconfigured fails here, once, before the worker
//! serves its first request: cleaner bindings are instantiated and checked
//! against the [`Cleaner`](crate::Cleaner) contract, the controller white
//! list is derived from configuration, and the container's register arity is
//! probed and pinned. The per-request path then carries no validation.

use std::sync::Arc;

use crate::app::{AppProbe, Container, ProviderRegistry, ServiceRef};
use crate::cleaners::{
    CleanerHandle, ConfigCleaner, ContainerCleaner, CookieCleaner, RequestCleaner, BUILT_IN,
    CONFIG_CLEANER, CONTAINER_CLEANER, COOKIE_CLEANER, REQUEST_CLEANER,
};
use crate::config::Config;
use crate::core::coordinator::Coordinator;
use crate::core::whitelist::ControllerWhitelist;
use crate::error::SetupError;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Default event-bus ring-buffer capacity.
const DEFAULT_BUS_CAPACITY: usize = 256;

/// Builder for constructing a [`Coordinator`] with optional collaborators.
pub struct CoordinatorBuilder {
    cfg: Config,
    current: Arc<Container>,
    snapshot: Arc<Container>,
    providers: ProviderRegistry,
    subscribers: Vec<Arc<dyn Subscribe>>,
    bus_capacity: usize,
}

impl CoordinatorBuilder {
    /// New builder over the worker's container pair.
    pub fn new(cfg: Config, current: Arc<Container>, snapshot: Arc<Container>) -> Self {
        Self {
            cfg,
            current,
            snapshot,
            providers: ProviderRegistry::new(),
            subscribers: Vec::new(),
            bus_capacity: DEFAULT_BUS_CAPACITY,
        }
    }

    /// Sets the registry resolving `register_providers` identifiers.
    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    /// Sets reset-cycle subscribers (logging, metrics, audit).
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Overrides the event-bus capacity.
    pub fn with_bus_capacity(mut self, capacity: usize) -> Self {
        self.bus_capacity = capacity;
        self
    }

    /// Builds the coordinator.
    ///
    /// # Errors
    /// - [`SetupError::MissingCleaner`] — a configured cleaner key has no
    ///   container binding;
    /// - [`SetupError::CleanerContract`] — a cleaner binding resolved to a
    ///   service that is not a [`CleanerHandle`](crate::CleanerHandle);
    /// - [`SetupError::UnknownRegisterShape`] — the container's register
    ///   arity is not one of the three supported shapes.
    pub fn build(self) -> Result<Arc<Coordinator>, SetupError> {
        let probe = AppProbe::inspect(&self.current)?;

        self.register_built_ins();
        let cleaners = self.validate_cleaners()?;

        let whitelist =
            ControllerWhitelist::from_entries(&self.cfg.destroy_controllers.excluded_list);

        let bus = Bus::new(self.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));

        Ok(Arc::new(Coordinator {
            cfg: self.cfg,
            current: self.current,
            snapshot: self.snapshot,
            cleaners,
            providers: self.providers,
            whitelist,
            probe,
            bus,
            subs,
        }))
    }

    /// Registers the four built-in cleaners as singletons in the current
    /// container, the same way extension cleaners are expected to be bound
    /// by the caller.
    fn register_built_ins(&self) {
        let pairs: [(&str, fn(Arc<Container>, Arc<Container>) -> Arc<CleanerHandle>); 4] = [
            (CONTAINER_CLEANER, |cur, snap| {
                Arc::new(CleanerHandle(Arc::new(ContainerCleaner::new(cur, snap))))
            }),
            (CONFIG_CLEANER, |cur, snap| {
                Arc::new(CleanerHandle(Arc::new(ConfigCleaner::new(cur, snap))))
            }),
            (COOKIE_CLEANER, |cur, snap| {
                Arc::new(CleanerHandle(Arc::new(CookieCleaner::new(cur, snap))))
            }),
            (REQUEST_CLEANER, |cur, snap| {
                Arc::new(CleanerHandle(Arc::new(RequestCleaner::new(cur, snap))))
            }),
        ];

        for (key, construct) in pairs {
            let cur = self.current.clone();
            let snap = self.snapshot.clone();
            self.current.singleton(key, move |_| {
                construct(cur.clone(), snap.clone()) as ServiceRef
            });
        }
    }

    /// Produces the deduplicated invocation order (extensions prepended
    /// before the built-ins) and eagerly instantiates and checks every
    /// cleaner against the contract.
    fn validate_cleaners(&self) -> Result<Vec<String>, SetupError> {
        let mut order: Vec<String> = Vec::new();
        for key in self
            .cfg
            .cleaners
            .iter()
            .map(String::as_str)
            .chain(BUILT_IN.iter().copied())
        {
            if !order.iter().any(|k| k == key) {
                order.push(key.to_string());
            }
        }

        for key in &order {
            let Some(service) = self.current.make(key) else {
                return Err(SetupError::MissingCleaner {
                    binding: key.clone(),
                });
            };
            if service.downcast::<CleanerHandle>().is_err() {
                return Err(SetupError::CleanerContract {
                    binding: key.clone(),
                });
            }
        }

        Ok(order)
    }
}

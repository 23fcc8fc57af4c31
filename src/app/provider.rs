//! # Service providers and the loadable-provider registry.
//!
//! Some providers bind per-request state during their `register` phase and
//! must be re-registered after every request. [`ProviderRegistry`] maps a
//! configured provider identifier to a factory producing the provider; an
//! identifier with no factory models "class is not loadable" and is skipped
//! by the coordinator, never treated as fatal.

use std::collections::HashMap;
use std::sync::Arc;

use super::container::Container;

/// Contract for a re-registrable service provider.
pub trait ServiceProvider: Send + Sync + 'static {
    /// Fully-qualified provider class name, as tracked by the framework's
    /// loaded-provider list.
    fn name(&self) -> &str;

    /// Binds the provider's services into `app`. May run more than once per
    /// worker; implementations must tolerate re-registration.
    fn register(&self, app: &Container);
}

/// Factory producing a provider instance for registration.
pub type ProviderFactory = Arc<dyn Fn() -> Arc<dyn ServiceProvider> + Send + Sync>;

/// Identifier → provider factory map.
///
/// Lookup failure is the "class not loadable" condition: the coordinator
/// skips that one entry and continues the list.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider factory under `id`.
    pub fn insert<F>(&mut self, id: &str, factory: F)
    where
        F: Fn() -> Arc<dyn ServiceProvider> + Send + Sync + 'static,
    {
        self.factories.insert(id.to_string(), Arc::new(factory));
    }

    /// Instantiates the provider for `id`, or `None` when it is not
    /// loadable.
    pub fn load(&self, id: &str) -> Option<Arc<dyn ServiceProvider>> {
        self.factories.get(id).map(|f| f())
    }
}

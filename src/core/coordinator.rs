//! # Coordinator: drives the post-request reset cycle.
//!
//! The [`Coordinator`] owns the worker's container pair (current +
//! snapshot), the validated cleaner registration order, the provider
//! registry, the controller white list, the pinned register shape, and the
//! event bus. The dispatch layer signals request completion; the
//! coordinator answers with the fixed cycle:
//!
//! ```text
//! request N completes
//!     │
//!     ├─► clean()              every registered cleaner, registration order,
//!     │                        exactly once (extensions first, then the four
//!     │                        built-ins)
//!     ├─► clean_providers()    re-register configured per-request providers
//!     │                        through the startup-pinned RegisterShape;
//!     │                        unknown identifiers are soft-skipped
//!     └─► clean_controllers()  detach the resolved controller from the
//!                              current route unless white-listed
//!     │
//! worker accepts request N+1
//! ```
//!
//! Everything that can fail was validated at build time
//! ([`CoordinatorBuilder`](crate::CoordinatorBuilder)); the cycle itself is
//! synchronous in-memory mutation with no error path.

use std::fmt;
use std::sync::Arc;

use crate::app::{AppProbe, Container, ProviderRegistry, Router, ROUTER};
use crate::cleaners::CleanerHandle;
use crate::config::Config;
use crate::core::builder::CoordinatorBuilder;
use crate::core::whitelist::ControllerWhitelist;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;

/// Snapshot/restore coordinator for one worker's container pair.
pub struct Coordinator {
    pub(crate) cfg: Config,
    pub(crate) current: Arc<Container>,
    pub(crate) snapshot: Arc<Container>,
    /// Validated cleaner binding keys, invocation order.
    pub(crate) cleaners: Vec<String>,
    pub(crate) providers: ProviderRegistry,
    pub(crate) whitelist: ControllerWhitelist,
    pub(crate) probe: AppProbe,
    pub(crate) bus: Bus,
    pub(crate) subs: Arc<SubscriberSet>,
}

impl Coordinator {
    /// Starts building a coordinator over the given container pair.
    ///
    /// `snapshot` must be the frozen post-boot container
    /// ([`Container::snapshot`]), taken before the first request.
    pub fn builder(
        cfg: Config,
        current: Arc<Container>,
        snapshot: Arc<Container>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder::new(cfg, current, snapshot)
    }

    /// The event bus shared with the dispatch layer.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The request-mutated container.
    pub fn current(&self) -> &Arc<Container> {
        &self.current
    }

    /// The frozen post-boot container.
    pub fn snapshot(&self) -> &Arc<Container> {
        &self.snapshot
    }

    /// Cleaner binding keys in invocation order.
    pub fn cleaner_order(&self) -> &[String] {
        &self.cleaners
    }

    /// Runs the full reset cycle in the mandated order.
    ///
    /// Invoked once per request-completion signal, strictly between
    /// requests; never concurrently with request-handling code.
    pub fn on_request_done(&self) {
        self.clean();
        self.clean_providers();
        self.clean_controllers();
    }

    /// Invokes every registered cleaner, in registration order, exactly
    /// once.
    ///
    /// Cleaners were validated and cached as container singletons at build
    /// time, so this path carries no checks; a binding that disappeared
    /// since (caller tampering) is skipped rather than panicking.
    pub fn clean(&self) {
        for key in &self.cleaners {
            if let Some(handle) = self.current.make_as::<CleanerHandle>(key) {
                handle.0.clean();
                self.bus
                    .publish(Event::now(EventKind::CleanerRan).with_binding(key));
            }
        }
    }

    /// Re-registers the configured per-request providers.
    ///
    /// Identifiers that are not loadable are skipped one by one; the rest of
    /// the list always runs. For the slim framework flavor the tracked
    /// loaded-provider list is pruned of each provider's class name *before*
    /// its registration (re-registration is intentional and must not hit the
    /// duplicate guard) and the pruned list is persisted after the loop.
    pub fn clean_providers(&self) {
        let mut tracked = self
            .cfg
            .flavor
            .tracks_loaded_providers()
            .then(|| self.current.loaded_providers());

        for id in &self.cfg.register_providers {
            let Some(provider) = self.providers.load(id) else {
                self.bus.publish(
                    Event::now(EventKind::ProviderSkipped)
                        .with_binding(id)
                        .with_detail("not loadable"),
                );
                continue;
            };

            if let Some(list) = tracked.as_mut() {
                list.retain(|name| name != provider.name());
                self.current.set_loaded_providers(list.clone());
            }

            self.probe.register(&self.current, provider.as_ref());
            self.bus
                .publish(Event::now(EventKind::ProviderReregistered).with_binding(id));
        }

        if let Some(list) = tracked {
            self.current.set_loaded_providers(list);
        }
    }

    /// Detaches the resolved controller instance from the current route.
    ///
    /// No-op when the flavor does not support it, when disabled by config,
    /// when no route is matched, when the route carries no controller, or
    /// when the controller class is white-listed. The public slot is tried
    /// first; the hidden slot of the older framework line is the fallback.
    pub fn clean_controllers(&self) {
        if !self.cfg.flavor.supports_controller_cleanup() {
            return;
        }
        if !self.cfg.destroy_controllers.enable {
            return;
        }
        let Some(router) = self.current.make_as::<Router>(ROUTER) else {
            return;
        };
        let Some(route) = router.current() else {
            return;
        };

        if route.exposes_controller() {
            if let Some(controller) = route.controller() {
                if !self.whitelist.is_excluded(&controller.class) {
                    route.detach_controller();
                    self.publish_detached(&controller.class, "public");
                }
            }
        } else if let Some(controller) = route.hidden_controller() {
            if !self.whitelist.is_excluded(&controller.class) {
                route.clear_hidden_controller();
                self.publish_detached(&controller.class, "hidden");
            }
        }
    }

    fn publish_detached(&self, class: &str, slot: &str) {
        self.bus.publish(
            Event::now(EventKind::ControllerDetached)
                .with_binding(class)
                .with_detail(slot),
        );
    }
}

// Containers and subscriber workers carry no useful Debug surface; report
// the configuration-derived state instead.
impl fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("flavor", &self.cfg.flavor)
            .field("cleaners", &self.cleaners)
            .field("register_shape", &self.probe.shape())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::provider::tests::ProbeProvider;
    use crate::app::{
        BoundController, ConfigRepository, CookieJar, Request, Route, ServiceProvider, ServiceRef,
        CONFIG, COOKIE, REQUEST,
    };
    use crate::cleaners::{
        Cleaner, CONFIG_CLEANER, CONTAINER_CLEANER, COOKIE_CLEANER, REQUEST_CLEANER,
    };
    use crate::config::{DestroyControllers, Flavor};
    use std::sync::Mutex;

    /// Boots a current container with the standard services and takes the
    /// post-boot snapshot, mirroring worker startup.
    fn boot() -> (Arc<Container>, Arc<Container>) {
        let current = Container::new();
        current.singleton(CONFIG, |_| {
            Arc::new(ConfigRepository::seeded([
                ("app.name", "demo"),
                ("app.debug", "false"),
            ])) as ServiceRef
        });
        current.singleton(COOKIE, |_| Arc::new(CookieJar::new()) as ServiceRef);
        current.singleton(ROUTER, |_| Arc::new(Router::new()) as ServiceRef);
        current.make(CONFIG);
        current.make(COOKIE);
        current.make(ROUTER);

        let snapshot = current.snapshot();
        (current, snapshot)
    }

    fn coordinator(cfg: Config) -> Arc<Coordinator> {
        let (current, snapshot) = boot();
        Coordinator::builder(cfg, current, snapshot)
            .build()
            .expect("coordinator builds")
    }

    fn simulate_request(co: &Coordinator) {
        let app = &co.current;
        app.make_as::<ConfigRepository>(CONFIG)
            .expect("config")
            .set("app.debug", "true");
        app.make_as::<CookieJar>(COOKIE)
            .expect("cookies")
            .queue("session", "abc123");
        app.instance(REQUEST, Arc::new(Request::new("GET", "/cart")));
    }

    #[test]
    fn clean_restores_config_to_snapshot_values() {
        let co = coordinator(Config::default());
        simulate_request(&co);

        co.clean();

        let current = co.current.make_as::<ConfigRepository>(CONFIG).expect("config");
        let pristine = co
            .snapshot
            .make_as::<ConfigRepository>(CONFIG)
            .expect("snapshot config");
        assert_eq!(current.all(), pristine.all());
        assert_eq!(current.get("app.debug").as_deref(), Some("false"));
    }

    #[test]
    fn clean_flushes_cookies_and_detaches_request() {
        let co = coordinator(Config::default());
        simulate_request(&co);

        co.clean();

        let jar = co.current.make_as::<CookieJar>(COOKIE).expect("cookies");
        assert!(jar.queued().is_empty());
        assert!(co.current.raw_instance(REQUEST).is_none());
    }

    #[test]
    fn clean_twice_equals_clean_once() {
        let co = coordinator(Config::default());
        simulate_request(&co);

        co.clean();
        let after_once = co
            .current
            .make_as::<ConfigRepository>(CONFIG)
            .expect("config")
            .all();

        co.clean();
        let after_twice = co
            .current
            .make_as::<ConfigRepository>(CONFIG)
            .expect("config")
            .all();

        assert_eq!(after_once, after_twice);
        assert!(co
            .current
            .make_as::<CookieJar>(COOKIE)
            .expect("cookies")
            .queued()
            .is_empty());
        assert!(co.current.raw_instance(REQUEST).is_none());
    }

    /// Extension cleaner that records its position in the invocation order.
    struct RecordingCleaner {
        label: &'static str,
        order: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Cleaner for RecordingCleaner {
        fn clean(&self) {
            self.order
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(self.label);
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    #[test]
    fn extension_cleaners_run_before_built_ins_in_registration_order() {
        let (current, snapshot) = boot();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let recorder = order.clone();
        current.singleton("cleaner.cache", move |_| {
            Arc::new(CleanerHandle(Arc::new(RecordingCleaner {
                label: "cache",
                order: recorder.clone(),
            }))) as ServiceRef
        });

        let cfg = Config {
            // Duplicate of a built-in on purpose: dedup keeps first position.
            cleaners: vec!["cleaner.cache".into(), CONFIG_CLEANER.into()],
            ..Config::default()
        };
        let co = Coordinator::builder(cfg, current, snapshot)
            .build()
            .expect("builds");

        assert_eq!(
            co.cleaner_order(),
            &[
                "cleaner.cache".to_string(),
                CONFIG_CLEANER.to_string(),
                CONTAINER_CLEANER.to_string(),
                COOKIE_CLEANER.to_string(),
                REQUEST_CLEANER.to_string(),
            ]
        );

        co.clean();
        assert_eq!(
            order.lock().unwrap_or_else(|e| e.into_inner()).as_slice(),
            &["cache"]
        );
    }

    #[test]
    fn container_cleaner_flushes_scoped_and_reseeds_marked_bindings() {
        let current = Container::new();
        current.scoped("auth", |_| Arc::new(String::from("guard")) as ServiceRef);
        current.singleton("url", |_| Arc::new(String::from("http://boot")) as ServiceRef);
        current.mark_reseed("url");
        current.make("auth");
        current.make("url");
        let snapshot = current.snapshot();

        let co = Coordinator::builder(Config::default(), current, snapshot)
            .build()
            .expect("builds");

        // Request rebinds "url" and resolves the scoped guard.
        co.current
            .instance("url", Arc::new(String::from("http://mutated")));

        co.clean();

        assert!(!co.current.is_resolved("auth"));
        let reseeded = co.current.make_as::<String>("url").expect("url");
        assert_eq!(*reseeded, "http://boot");
    }

    fn provider_registry(ids: &[&str]) -> ProviderRegistry {
        let mut reg = ProviderRegistry::new();
        for id in ids {
            let provider: Arc<dyn ServiceProvider> = ProbeProvider::shared(id);
            reg.insert(id, move || provider.clone());
        }
        reg
    }

    #[test]
    fn clean_providers_reregisters_loadable_and_skips_missing() {
        let (current, snapshot) = boot();
        let cfg = Config {
            register_providers: vec!["App\\Providers\\A".into(), "App\\Providers\\B".into()],
            ..Config::default()
        };
        let co = Coordinator::builder(cfg, current, snapshot)
            .with_providers(provider_registry(&["App\\Providers\\A"]))
            .build()
            .expect("builds");

        let mut rx = co.bus().subscribe();
        co.clean_providers();

        assert!(co
            .current
            .loaded_providers()
            .contains(&"App\\Providers\\A".to_string()));

        let mut reregistered = Vec::new();
        let mut skipped = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            match ev.kind {
                EventKind::ProviderReregistered => reregistered.push(ev.binding),
                EventKind::ProviderSkipped => skipped.push(ev.binding),
                _ => {}
            }
        }
        assert_eq!(reregistered, vec![Some("App\\Providers\\A".to_string())]);
        assert_eq!(skipped, vec![Some("App\\Providers\\B".to_string())]);
    }

    #[test]
    fn slim_flavor_prunes_and_persists_tracked_provider_list() {
        let (current, snapshot) = boot();
        // Simulate boot-time registration tracked by the slim framework.
        current.set_loaded_providers(vec![
            "App\\Providers\\Session".into(),
            "App\\Providers\\Mail".into(),
        ]);

        let cfg = Config {
            register_providers: vec!["App\\Providers\\Session".into()],
            flavor: Flavor::Slim,
            ..Config::default()
        };
        let co = Coordinator::builder(cfg, current, snapshot)
            .with_providers(provider_registry(&["App\\Providers\\Session"]))
            .build()
            .expect("builds");

        co.clean_providers();

        // The re-registered provider's name is pruned from the persisted
        // list so the next cycle's registration is never a duplicate no-op.
        let tracked = co.current.loaded_providers();
        assert!(!tracked.contains(&"App\\Providers\\Session".to_string()));
        assert!(tracked.contains(&"App\\Providers\\Mail".to_string()));
    }

    #[test]
    fn slim_flavor_reregisters_past_the_duplicate_guard() {
        let (current, snapshot) = boot();
        let provider = ProbeProvider::shared("App\\Providers\\Session");
        let dyn_provider: Arc<dyn ServiceProvider> = provider.clone();
        let mut reg = ProviderRegistry::new();
        reg.insert("App\\Providers\\Session", move || dyn_provider.clone());

        // Boot registered the provider once through the arity-1 guard path.
        current.register(provider.as_ref());
        assert_eq!(provider.registrations(), 1);

        let cfg = Config {
            register_providers: vec!["App\\Providers\\Session".into()],
            flavor: Flavor::Slim,
            ..Config::default()
        };
        let co = Coordinator::builder(cfg, current, snapshot)
            .with_providers(reg)
            .build()
            .expect("builds");

        co.clean_providers();
        co.clean_providers();

        // Without the pre-registration prune the guard would swallow both.
        assert_eq!(provider.registrations(), 3);
    }

    fn route_config(excluded: Vec<String>) -> Config {
        Config {
            destroy_controllers: DestroyControllers {
                enable: true,
                excluded_list: excluded,
            },
            ..Config::default()
        }
    }

    fn attach_route(co: &Coordinator, class: &str, exposed: bool) -> Arc<Route> {
        let controller = BoundController::new(class, Arc::new(()));
        let route = if exposed {
            Arc::new(Route::with_exposed_controller("/things/{id}", Some(controller)))
        } else {
            Arc::new(Route::with_hidden_controller("/things/{id}", Some(controller)))
        };
        co.current
            .make_as::<Router>(ROUTER)
            .expect("router")
            .set_current(route.clone());
        route
    }

    #[test]
    fn controller_is_detached_from_public_slot() {
        let co = coordinator(route_config(vec![]));
        let route = attach_route(&co, "App\\Http\\CartController", true);

        co.clean_controllers();
        assert!(route.controller().is_none());
    }

    #[test]
    fn hidden_slot_is_cleared_through_the_escape_hatch() {
        let co = coordinator(route_config(vec![]));
        let route = attach_route(&co, "App\\Http\\LegacyController", false);

        co.clean_controllers();
        assert!(route.hidden_controller().is_none());
    }

    #[test]
    fn white_listed_controllers_survive_exact_and_prefix() {
        let co = coordinator(route_config(vec![
            "App\\Http\\HealthController".into(),
            "App\\Admin\\*".into(),
        ]));

        let exact = attach_route(&co, "App\\Http\\HealthController", true);
        co.clean_controllers();
        assert!(exact.controller().is_some());

        let prefixed = attach_route(&co, "App\\Admin\\AuditController", true);
        co.clean_controllers();
        assert!(prefixed.controller().is_some());

        let plain = attach_route(&co, "App\\Http\\CartController", true);
        co.clean_controllers();
        assert!(plain.controller().is_none());
    }

    #[test]
    fn disabled_destroy_leaves_controllers_untouched() {
        let mut cfg = route_config(vec![]);
        cfg.destroy_controllers.enable = false;
        let co = coordinator(cfg);
        let route = attach_route(&co, "App\\Http\\CartController", true);

        co.clean_controllers();
        assert!(route.controller().is_some());
    }

    #[test]
    fn slim_flavor_never_touches_controllers() {
        let mut cfg = route_config(vec![]);
        cfg.flavor = Flavor::Slim;
        let co = coordinator(cfg);
        let route = attach_route(&co, "App\\Http\\CartController", true);

        co.clean_controllers();
        assert!(route.controller().is_some());
    }

    #[test]
    fn absence_conditions_are_benign() {
        // No route matched.
        let co = coordinator(route_config(vec![]));
        co.clean_controllers();

        // Route without a controller.
        let router = co.current.make_as::<Router>(ROUTER).expect("router");
        router.set_current(Arc::new(Route::with_exposed_controller("/ping", None)));
        co.clean_controllers();

        // No router binding at all.
        let bare_current = Container::new();
        let bare_snapshot = bare_current.snapshot();
        let bare = Coordinator::builder(route_config(vec![]), bare_current, bare_snapshot)
            .build()
            .expect("builds");
        bare.clean_controllers();
    }

    // Tests assert on build() failures via expect_err, which needs the Ok
    // side to be Debug-formattable.
    #[test]
    fn debug_output_reports_cleaner_order_and_shape() {
        let co = coordinator(Config::default());
        let rendered = format!("{co:?}");
        assert!(rendered.contains("Coordinator"));
        assert!(rendered.contains(CONFIG_CLEANER));
        assert!(rendered.contains("Basic"));
    }

    #[test]
    fn on_request_done_runs_the_full_cycle() {
        let cfg = Config {
            register_providers: vec!["App\\Providers\\A".into()],
            destroy_controllers: DestroyControllers {
                enable: true,
                excluded_list: vec![],
            },
            ..Config::default()
        };
        let (current, snapshot) = boot();
        let co = Coordinator::builder(cfg, current, snapshot)
            .with_providers(provider_registry(&["App\\Providers\\A"]))
            .build()
            .expect("builds");

        simulate_request(&co);
        let route = attach_route(&co, "App\\Http\\CartController", true);

        co.on_request_done();

        let config = co.current.make_as::<ConfigRepository>(CONFIG).expect("config");
        assert_eq!(config.get("app.debug").as_deref(), Some("false"));
        assert!(co.current.raw_instance(REQUEST).is_none());
        assert!(route.controller().is_none());
        assert!(co
            .current
            .loaded_providers()
            .contains(&"App\\Providers\\A".to_string()));
    }
}

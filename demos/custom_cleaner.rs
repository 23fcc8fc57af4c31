//! # Example: custom_cleaner
//!
//! Demonstrates an extension cleaner running **before** the four built-ins,
//! with the built-in [`LogWriter`] subscriber printing the cycle.
//!
//! Shows how to:
//! - Implement the [`Cleaner`] trait for app-specific request state.
//! - Bind it in the current container under a key listed in
//!   [`Config::cleaners`].
//! - Watch the registration order through [`Coordinator::cleaner_order`].
//!
//! ## Run
//! ```bash
//! cargo run --example custom_cleaner --features logging
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use snapback::{
    Cleaner, CleanerHandle, Config, ConfigRepository, Container, Coordinator, CookieJar,
    Event, EventKind, LogWriter, Router, ServiceRef, Subscribe, CONFIG, COOKIE, ROUTER,
};
use tokio_util::sync::CancellationToken;

/// Per-request render cache the framework knows nothing about.
#[derive(Default)]
struct RenderCache {
    entries: Mutex<Vec<String>>,
}

impl RenderCache {
    fn put(&self, key: &str) {
        self.entries.lock().unwrap().push(key.to_string());
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

/// Extension cleaner owning exactly the render-cache category.
struct RenderCacheCleaner {
    cache: Arc<RenderCache>,
}

impl Cleaner for RenderCacheCleaner {
    fn clean(&self) {
        self.cache.clear();
    }

    fn name(&self) -> &'static str {
        "render_cache_cleaner"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let current = Container::new();
    current.singleton(CONFIG, |_| {
        Arc::new(ConfigRepository::seeded([("app.name", "demo")])) as ServiceRef
    });
    current.singleton(COOKIE, |_| Arc::new(CookieJar::new()) as ServiceRef);
    current.singleton(ROUTER, |_| Arc::new(Router::new()) as ServiceRef);
    current.make(CONFIG);
    current.make(COOKIE);
    current.make(ROUTER);

    let cache = Arc::new(RenderCache::default());
    let bound = cache.clone();
    current.singleton("cleaner.render_cache", move |_| {
        Arc::new(CleanerHandle(Arc::new(RenderCacheCleaner {
            cache: bound.clone(),
        }))) as ServiceRef
    });

    let snapshot = current.snapshot();

    let cfg = Config {
        cleaners: vec!["cleaner.render_cache".into()],
        ..Config::default()
    };
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let coordinator = Coordinator::builder(cfg, current.clone(), snapshot)
        .with_subscribers(subscribers)
        .build()?;

    println!("cleaner order: {:?}\n", coordinator.cleaner_order());

    let token = CancellationToken::new();
    let listener = coordinator.spawn_listener(token.clone());
    let mut cycle_rx = coordinator.bus().subscribe();

    cache.put("header");
    cache.put("footer");
    println!("render cache before reset: {} entries", cache.len());

    coordinator
        .bus()
        .publish(Event::now(EventKind::RequestFinished));
    while let Ok(ev) = cycle_rx.recv().await {
        if ev.kind == EventKind::ResetCompleted {
            break;
        }
    }

    // Let LogWriter drain its queue before we exit.
    tokio::time::sleep(Duration::from_millis(50)).await;
    println!("render cache after reset:  {} entries", cache.len());

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), listener).await??;
    Ok(())
}

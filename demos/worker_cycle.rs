//! # Example: worker_cycle
//!
//! Simulates one worker's lifetime: boot the framework container, freeze the
//! post-boot snapshot, then serve two "requests" that mutate request-scoped
//! state, with the reset cycle running between them.
//!
//! Shows how to:
//! - Boot a [`Container`] and take the snapshot before the first request.
//! - Build a [`Coordinator`] and attach its listener to the bus.
//! - Signal request completion the way a dispatch loop would
//!   (publish [`EventKind::RequestFinished`]).
//!
//! ## Run
//! ```bash
//! cargo run --example worker_cycle
//! ```

use std::sync::Arc;
use std::time::Duration;

use snapback::{
    BoundController, Config, ConfigRepository, Container, Coordinator, CookieJar,
    DestroyControllers, Event, EventKind, Request, Route, Router, ServiceRef, CONFIG, COOKIE,
    REQUEST, ROUTER,
};
use tokio_util::sync::CancellationToken;

/// Boot-time wiring a framework bootstrapper would normally do.
fn boot() -> Arc<Container> {
    let app = Container::new();
    app.singleton(CONFIG, |_| {
        Arc::new(ConfigRepository::seeded([
            ("app.name", "storefront"),
            ("app.debug", "false"),
        ])) as ServiceRef
    });
    app.singleton(COOKIE, |_| Arc::new(CookieJar::new()) as ServiceRef);
    app.singleton(ROUTER, |_| Arc::new(Router::new()) as ServiceRef);
    app.make(CONFIG);
    app.make(COOKIE);
    app.make(ROUTER);
    app
}

/// What a request handler does to the container while running.
fn handle_request(app: &Arc<Container>, path: &str) {
    app.instance(REQUEST, Arc::new(Request::new("GET", path)));
    app.make_as::<ConfigRepository>(CONFIG)
        .expect("config")
        .set("app.debug", "true");
    app.make_as::<CookieJar>(COOKIE)
        .expect("cookies")
        .queue("session", "s3cr3t");

    let route = Arc::new(Route::with_exposed_controller(
        path,
        Some(BoundController::new("App\\Http\\PageController", Arc::new(()))),
    ));
    app.make_as::<Router>(ROUTER)
        .expect("router")
        .set_current(route);
}

fn report(app: &Arc<Container>, label: &str) {
    let config = app.make_as::<ConfigRepository>(CONFIG).expect("config");
    let cookies = app.make_as::<CookieJar>(COOKIE).expect("cookies");
    println!(
        "[{label}] app.debug={:?} queued_cookies={} request_bound={}",
        config.get("app.debug"),
        cookies.queued().len(),
        app.raw_instance(REQUEST).is_some(),
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let current = boot();
    let snapshot = current.snapshot();

    let cfg = Config {
        destroy_controllers: DestroyControllers {
            enable: true,
            excluded_list: vec!["App\\Admin\\*".into()],
        },
        ..Config::default()
    };
    let coordinator = Coordinator::builder(cfg, current.clone(), snapshot).build()?;

    let token = CancellationToken::new();
    let listener = coordinator.spawn_listener(token.clone());
    let mut cycle_rx = coordinator.bus().subscribe();

    for (n, path) in ["/products/42", "/cart"].into_iter().enumerate() {
        println!("--- request {} ({path}) ---", n + 1);
        handle_request(&current, path);
        report(&current, "after handling");

        // The dispatch loop's completion signal.
        coordinator
            .bus()
            .publish(Event::now(EventKind::RequestFinished));
        while let Ok(ev) = cycle_rx.recv().await {
            if ev.kind == EventKind::ResetCompleted {
                break;
            }
        }
        report(&current, "after reset  ");
    }

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), listener).await??;
    Ok(())
}

//! # Request-completion hook.
//!
//! Bridge between the external event-driven dispatch loop and the
//! synchronous reset cycle. The dispatch layer publishes
//! [`EventKind::RequestFinished`] on the shared bus after each request; the
//! listener spawned here runs the cycle and publishes
//! [`EventKind::ResetCompleted`], fanning every event out to the attached
//! subscribers along the way.
//!
//! ```text
//! dispatch ── publish(RequestFinished) ──► Bus ──► listener
//!                                                    ├─► on_request_done()
//!                                                    │     clean()
//!                                                    │     clean_providers()
//!                                                    │     clean_controllers()
//!                                                    ├─► publish(ResetCompleted)
//!                                                    └─► SubscriberSet::emit(..)
//! ```
//!
//! A worker serves one request at a time, so at most one `RequestFinished`
//! is ever outstanding; lag on the receiver can only skip the cycle's own
//! observability events, never a completion signal that still matters.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::coordinator::Coordinator;
use crate::events::{Event, EventKind};

impl Coordinator {
    /// Spawns the request-completion listener.
    ///
    /// Runs until `token` is cancelled or the bus closes. On the way out it
    /// publishes [`EventKind::ShutdownRequested`] (to bus receivers and to
    /// the attached subscribers) and drains the subscriber queues, so every
    /// event emitted before shutdown is still delivered. Call once during
    /// worker startup, after the snapshot is established.
    pub fn spawn_listener(self: &Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();
        let me = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => {
                            if ev.kind == EventKind::RequestFinished {
                                me.on_request_done();
                                me.bus.publish(Event::now(EventKind::ResetCompleted));
                            }
                            me.subs.emit(&ev);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    }
                }
            }
            // Flush events already on the bus so cancellation does not
            // drop them on the floor.
            loop {
                match rx.try_recv() {
                    Ok(ev) => me.subs.emit(&ev),
                    Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
            let done = Event::now(EventKind::ShutdownRequested);
            me.bus.publish(done.clone());
            me.subs.emit(&done);
            me.subs.close().await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ConfigRepository, Container, ServiceRef, CONFIG};
    use crate::config::Config;
    use crate::subscribers::Subscribe;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn booted_coordinator(subs: Vec<Arc<dyn Subscribe>>) -> Arc<Coordinator> {
        let current = Container::new();
        current.singleton(CONFIG, |_| {
            Arc::new(ConfigRepository::seeded([("app.env", "production")])) as ServiceRef
        });
        current.make(CONFIG);
        let snapshot = current.snapshot();

        Coordinator::builder(Config::default(), current, snapshot)
            .with_subscribers(subs)
            .build()
            .expect("coordinator builds")
    }

    async fn wait_for_reset(co: &Arc<Coordinator>) {
        let mut rx = co.bus().subscribe();
        co.bus().publish(Event::now(EventKind::RequestFinished));

        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                match rx.recv().await {
                    Ok(ev) if ev.kind == EventKind::ResetCompleted => break,
                    Ok(_) => {}
                    Err(_) => panic!("bus closed before reset completed"),
                }
            }
        })
        .await
        .expect("reset completes");
    }

    #[tokio::test]
    async fn request_finished_signal_triggers_the_reset_cycle() {
        let co = booted_coordinator(Vec::new());
        let token = CancellationToken::new();
        let listener = co.spawn_listener(token.clone());

        co.current()
            .make_as::<ConfigRepository>(CONFIG)
            .expect("config")
            .set("app.env", "hijacked");

        wait_for_reset(&co).await;

        let config = co
            .current()
            .make_as::<ConfigRepository>(CONFIG)
            .expect("config");
        assert_eq!(config.get("app.env").as_deref(), Some("production"));

        token.cancel();
        let _ = listener.await;
    }

    struct CycleCounter {
        resets: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Subscribe for CycleCounter {
        async fn on_event(&self, event: &Event) {
            if event.kind == EventKind::ResetCompleted {
                self.resets.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn name(&self) -> &'static str {
            "cycle_counter"
        }
    }

    #[tokio::test]
    async fn subscribers_observe_each_cycle_exactly_once() {
        let resets = Arc::new(AtomicUsize::new(0));
        let co = booted_coordinator(vec![Arc::new(CycleCounter {
            resets: resets.clone(),
        })]);
        let token = CancellationToken::new();
        let listener = co.spawn_listener(token.clone());

        wait_for_reset(&co).await;
        wait_for_reset(&co).await;

        token.cancel();
        let _ = listener.await;

        // The exiting listener drains the subscriber queues, so everything
        // emitted before shutdown has been delivered by now.
        assert_eq!(resets.load(Ordering::SeqCst), 2);
    }

    struct KindRecorder {
        kinds: Arc<std::sync::Mutex<Vec<EventKind>>>,
    }

    #[async_trait]
    impl Subscribe for KindRecorder {
        async fn on_event(&self, event: &Event) {
            self.kinds
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(event.kind);
        }

        fn name(&self) -> &'static str {
            "kind_recorder"
        }
    }

    #[tokio::test]
    async fn subscribers_observe_the_shutdown_event() {
        let kinds: Arc<std::sync::Mutex<Vec<EventKind>>> =
            Arc::new(std::sync::Mutex::new(Vec::new()));
        let co = booted_coordinator(vec![Arc::new(KindRecorder {
            kinds: kinds.clone(),
        })]);
        let token = CancellationToken::new();
        let listener = co.spawn_listener(token.clone());

        wait_for_reset(&co).await;
        token.cancel();
        let _ = listener.await;

        let seen = kinds.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(seen.last(), Some(&EventKind::ShutdownRequested));
        assert!(seen.contains(&EventKind::ResetCompleted));
    }
}

//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`] to all subscribers without
//! awaiting their processing.
//!
//! ## Guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and reported on the bus.
//!
//! ## Not guaranteed
//! - No global ordering across different subscribers.
//! - No retries on queue overflow (the event is dropped for that subscriber
//!   and an overflow event is published).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use super::Subscribe;
use crate::events::{Bus, Event, EventKind};

/// Per-subscriber channel with metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
///
/// Channels and worker handles sit behind mutexes so [`SubscriberSet::close`]
/// can drain through a shared handle (the coordinator holds the set in an
/// `Arc`).
pub struct SubscriberSet {
    channels: Mutex<Vec<SubscriberChannel>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    bus: Bus,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SubscriberSet {
    /// Builds the set and spawns one worker task per subscriber.
    ///
    /// `bus` receives [`EventKind::SubscriberPanicked`] /
    /// [`EventKind::SubscriberOverflow`] reports; those plumbing events are
    /// not fanned back out to avoid feedback loops.
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subscribers.len());
        let mut workers = Vec::with_capacity(subscribers.len());

        for sub in subscribers {
            let name = sub.name();
            let (tx, rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(Self::spawn_worker(sub, rx, bus.clone()));
        }

        Self {
            channels: Mutex::new(channels),
            workers: Mutex::new(workers),
            bus,
        }
    }

    /// Number of attached subscribers.
    pub fn len(&self) -> usize {
        lock(&self.channels).len()
    }

    /// True when no subscriber is attached.
    pub fn is_empty(&self) -> bool {
        lock(&self.channels).is_empty()
    }

    /// Queues `ev` for every subscriber; never awaits.
    ///
    /// After [`SubscriberSet::close`] the channel list is empty and this is
    /// a no-op.
    pub fn emit(&self, ev: &Event) {
        let channels = lock(&self.channels);
        if channels.is_empty() {
            return;
        }
        let shared = Arc::new(ev.clone());
        for ch in channels.iter() {
            match ch.sender.try_send(Arc::clone(&shared)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.report_overflow(ch.name, "full");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.report_overflow(ch.name, "closed");
                }
            }
        }
    }

    /// Closes all queues and waits for the workers to drain.
    ///
    /// Already-queued events are still delivered. Idempotent; a second call
    /// finds nothing to drain. Callable through a shared handle: the
    /// coordinator listener drains the set on shutdown.
    pub async fn close(&self) {
        lock(&self.channels).clear();
        let workers: Vec<JoinHandle<()>> = lock(&self.workers).drain(..).collect();
        for worker in workers {
            let _ = worker.await;
        }
    }

    fn report_overflow(&self, name: &'static str, reason: &str) {
        self.bus.publish(
            Event::now(EventKind::SubscriberOverflow)
                .with_binding(name)
                .with_detail(reason),
        );
    }

    fn spawn_worker(
        sub: Arc<dyn Subscribe>,
        mut rx: mpsc::Receiver<Arc<Event>>,
        bus: Bus,
    ) -> JoinHandle<()> {
        let name = sub.name();
        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev))
                    .catch_unwind()
                    .await;
                if handled.is_err() {
                    bus.publish(
                        Event::now(EventKind::SubscriberPanicked)
                            .with_binding(name)
                            .with_detail(ev.kind.as_label()),
                    );
                }
            }
        })
    }
}

//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [request-finished]
//! [cleaner] binding="cleaner.config"
//! [provider] binding="App\Providers\SessionProvider"
//! [provider-skipped] binding="App\Providers\Ghost" reason="not loadable"
//! [controller-detached] class="App\Http\PageController" slot="public"
//! [reset-completed]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::RequestFinished => {
                println!("[request-finished]");
            }
            EventKind::CleanerRan => {
                println!("[cleaner] binding={:?}", e.binding);
            }
            EventKind::ProviderReregistered => {
                println!("[provider] binding={:?}", e.binding);
            }
            EventKind::ProviderSkipped => {
                println!(
                    "[provider-skipped] binding={:?} reason={:?}",
                    e.binding, e.detail
                );
            }
            EventKind::ControllerDetached => {
                println!(
                    "[controller-detached] class={:?} slot={:?}",
                    e.binding, e.detail
                );
            }
            EventKind::ResetCompleted => {
                println!("[reset-completed]");
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.binding, e.detail
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} during={}",
                    e.binding.as_deref().unwrap_or("unknown"),
                    e.detail.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}

//! Container-state cleaner: request-scoped bindings and re-seeded services.

use std::sync::Arc;

use crate::app::Container;
use crate::cleaners::Cleaner;

/// Resets the container's own mutable state.
///
/// Two responsibilities per cycle:
/// 1. flush request-scoped instances (and their resolved flags) so the next
///    request re-resolves them fresh;
/// 2. re-seed every marked binding by copying its snapshot instance into the
///    current container, undoing request-time rebinding.
pub struct ContainerCleaner {
    current: Arc<Container>,
    snapshot: Arc<Container>,
}

impl ContainerCleaner {
    /// New cleaner over the worker's container pair.
    pub fn new(current: Arc<Container>, snapshot: Arc<Container>) -> Self {
        Self { current, snapshot }
    }
}

impl Cleaner for ContainerCleaner {
    fn clean(&self) {
        self.current.flush_scoped();
        for key in self.current.reseed_keys() {
            if let Some(pristine) = self.snapshot.raw_instance(&key) {
                self.current.instance(&key, pristine);
            }
        }
    }

    fn name(&self) -> &'static str {
        "container_cleaner"
    }
}

//! Configuration cleaner: undoes runtime config mutation.

use std::sync::Arc;

use crate::app::{ConfigRepository, Container, CONFIG};
use crate::cleaners::Cleaner;

/// Restores the configuration mapping to the snapshot's values.
///
/// Any `config.set(...)` performed during the request disappears; the next
/// request sees exactly the post-boot configuration. When either container
/// has no config binding there is nothing to restore and the cleaner is a
/// no-op.
pub struct ConfigCleaner {
    current: Arc<Container>,
    snapshot: Arc<Container>,
}

impl ConfigCleaner {
    /// New cleaner over the worker's container pair.
    pub fn new(current: Arc<Container>, snapshot: Arc<Container>) -> Self {
        Self { current, snapshot }
    }
}

impl Cleaner for ConfigCleaner {
    fn clean(&self) {
        let (Some(current), Some(pristine)) = (
            self.current.make_as::<ConfigRepository>(CONFIG),
            self.snapshot.make_as::<ConfigRepository>(CONFIG),
        ) else {
            return;
        };
        current.replace(pristine.all());
    }

    fn name(&self) -> &'static str {
        "config_cleaner"
    }
}

//! Request-object cleaner: detaches the bound request instance.

use std::sync::Arc;

use crate::app::{Container, REQUEST};
use crate::cleaners::Cleaner;

/// Forgets the bound request instance so a stale reference can never be
/// resolved by the next request before its own object is bound.
///
/// Already-absent binding is a no-op.
pub struct RequestCleaner {
    current: Arc<Container>,
}

impl RequestCleaner {
    /// New cleaner over the worker's container pair.
    pub fn new(current: Arc<Container>, _snapshot: Arc<Container>) -> Self {
        Self { current }
    }
}

impl Cleaner for RequestCleaner {
    fn clean(&self) {
        self.current.forget_instance(REQUEST);
    }

    fn name(&self) -> &'static str {
        "request_cleaner"
    }
}

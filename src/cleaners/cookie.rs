//! Cookie cleaner: drops the request's queued cookies.

use std::sync::Arc;

use crate::app::{Container, CookieJar, COOKIE};
use crate::cleaners::Cleaner;

/// Clears the cookie queue accumulated during the request.
///
/// An empty (or absent) jar is a no-op.
pub struct CookieCleaner {
    current: Arc<Container>,
}

impl CookieCleaner {
    /// New cleaner over the worker's container pair.
    pub fn new(current: Arc<Container>, _snapshot: Arc<Container>) -> Self {
        Self { current }
    }
}

impl Cleaner for CookieCleaner {
    fn clean(&self) {
        if let Some(jar) = self.current.make_as::<CookieJar>(COOKIE) {
            jar.flush_queued();
        }
    }

    fn name(&self) -> &'static str {
        "cookie_cleaner"
    }
}

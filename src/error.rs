//! Error types used by the snapback coordinator.
//!
//! Everything in here is a **startup-time configuration error**: a worker that
//! fails construction must never serve a request, because a broken reset
//! pipeline silently corrupts state on every cycle. There is deliberately no
//! per-request error type — a provider that cannot be loaded is a soft skip,
//! and absence conditions (no current route, no bound controller) are benign
//! no-ops handled inline.

use thiserror::Error;

/// # Errors raised while building a [`Coordinator`](crate::Coordinator).
///
/// All variants are fatal: construction aborts and the worker must not accept
/// requests. Checks run once at build time so the per-request path carries no
/// validation.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SetupError {
    /// A cleaner key from the configuration has no binding in the current
    /// container.
    #[error("cleaner binding {binding:?} is not registered in the container")]
    MissingCleaner {
        /// The unresolved binding key.
        binding: String,
    },

    /// A cleaner binding resolved to a service that does not satisfy the
    /// [`Cleaner`](crate::Cleaner) contract.
    #[error("binding {binding:?} does not implement the Cleaner contract")]
    CleanerContract {
        /// The offending binding key.
        binding: String,
    },

    /// The container's provider-registration entry point has an arity the
    /// coordinator does not recognize (supported shapes take 1, 2 or 3
    /// arguments).
    #[error("unsupported provider register arity: {arity}")]
    UnknownRegisterShape {
        /// The arity reported by the container.
        arity: usize,
    },
}

impl SetupError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use snapback::SetupError;
    ///
    /// let err = SetupError::UnknownRegisterShape { arity: 4 };
    /// assert_eq!(err.as_label(), "unknown_register_shape");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SetupError::MissingCleaner { .. } => "missing_cleaner",
            SetupError::CleanerContract { .. } => "cleaner_contract",
            SetupError::UnknownRegisterShape { .. } => "unknown_register_shape",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SetupError::MissingCleaner { binding } => {
                format!("no container binding for cleaner {binding:?}")
            }
            SetupError::CleanerContract { binding } => {
                format!("binding {binding:?} is not a cleaner")
            }
            SetupError::UnknownRegisterShape { arity } => {
                format!("register arity {arity} is not one of the supported shapes (1, 2, 3)")
            }
        }
    }
}

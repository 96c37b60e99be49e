//! Host hook errors.

use thiserror::Error;

/// Failure reported by a [`PageHooks`](crate::PageHooks) implementation.
#[derive(Debug, Error)]
pub enum HookError {
    /// The page-context script could not be injected (e.g. a restrictive
    /// content security policy).
    #[error("Page script injection failed: {0}")]
    ScriptInjection(String),

    /// The requested observation source does not exist on this host.
    #[error("Observation source unavailable: {0}")]
    Unavailable(String),
}

//! Element manager errors.

use thiserror::Error;

/// Element manager error types.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Query issued before `start()` or after `stop()`.
    #[error("Element manager is not running")]
    NotRunning,

    /// Configuration rejected at construction.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

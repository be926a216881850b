//! Error types for the engines
use thiserror::Error;
use wavegrid_core::CoreError;

/// Engine errors
///
/// Only construction can fail. Steady-state operations on a running or
/// disposed engine are silent no-ops.
#[derive(Error, Debug)]
pub enum ControlError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// No Tokio runtime is available to host the engine task
    #[error("No async runtime: {0}")]
    NoRuntime(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ControlError>;

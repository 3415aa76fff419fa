//! Error types for the engine core.

use thiserror::Error;

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level error type for all engine errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid unit identifier.
    #[error("Invalid unit ID: {0}")]
    InvalidUnitId(u32),

    /// A module failed to initialize.
    #[error("Module '{module}' failed to initialize: {reason}")]
    ModuleInit {
        /// Name of the failing module.
        module: String,
        /// Failure description.
        reason: String,
    },

    /// Operation attempted in the wrong engine state.
    #[error("Invalid engine state: {0}")]
    InvalidState(String),

    /// Scenario or catalog configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

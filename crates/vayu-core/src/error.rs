// ── Core error types ──
//
// Construction and validation failures only. Remote-call failures never
// surface here: resources fold them into `ResourceState::error`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The gateway client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] vayu_api::Error),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

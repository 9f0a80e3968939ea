//! CLI error types with miette diagnostics.
//!
//! Folds failed response envelopes, config and core errors into
//! user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use vayu_config::ConfigError;
use vayu_core::CoreError;
use vayu_core::resource::is_input_error;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_IMPLEMENTED: i32 = 3;
    pub const CONFIG: i32 = 4;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend ──────────────────────────────────────────────────────
    #[error("{resource} request failed: {message}")]
    #[diagnostic(
        code(vayu::request_failed),
        help(
            "Check that the Vayu backend is running and reachable.\n\
             URL: {url}\n\
             Try: vayu health --api-url <URL>"
        )
    )]
    Request {
        resource: String,
        message: String,
        url: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(vayu::not_implemented),
        help("The backend at {url} does not serve this endpoint yet.")
    )]
    NotImplemented { message: String, url: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vayu::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(code(vayu::rejected))]
    Rejected { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(vayu::config),
        help("Inspect the effective settings with: vayu config show")
    )]
    Config(#[from] ConfigError),

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(vayu::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(vayu::core))]
    Core(CoreError),

    // ── IO ────────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::Rejected { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            Self::NotImplemented { .. } => exit_code::NOT_IMPLEMENTED,
            Self::Config(_) => exit_code::CONFIG,
            Self::Request { .. } | Self::Core(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Classify the error message of a failed envelope.
    pub fn from_envelope(resource: &str, message: &str, not_implemented: bool, url: &str) -> Self {
        if not_implemented {
            Self::NotImplemented {
                message: message.to_owned(),
                url: url.to_owned(),
            }
        } else if is_input_error(message) {
            Self::Rejected {
                message: message.to_owned(),
            }
        } else {
            Self::Request {
                resource: resource.to_owned(),
                message: message.to_owned(),
                url: url.to_owned(),
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => Self::Rejected { message },
            CoreError::Config { message } => Self::Config(ConfigError::Validation {
                field: "sync".into(),
                reason: message,
            }),
            other @ CoreError::Api(_) => Self::Core(other),
        }
    }
}

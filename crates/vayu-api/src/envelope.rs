// ── Result envelope ──
//
// Uniform wrapper returned by every gateway operation. Mirrors the JSON
// shape `{success, data?, error?, notImplemented}` so consumers that
// serialize it (CLI `--output json`) see the same contract.

use serde::{Deserialize, Serialize};

/// Outcome of one remote call.
///
/// `success == true` implies `error.is_none()`; `success == false` implies
/// `error.is_some()`. `not_implemented` is orthogonal: it marks either a
/// server-side `501` or a locally substituted fallback fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub not_implemented: bool,
}

impl<T> ApiResult<T> {
    /// A successful call carrying the reshaped response body.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            not_implemented: false,
        }
    }

    /// A failed call.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            not_implemented: false,
        }
    }

    /// The server answered `501 Not Implemented`.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            not_implemented: true,
        }
    }

    /// Degraded-mode success: `data` is a local fixture, not server state.
    pub fn fallback(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            not_implemented: true,
        }
    }

    /// Attach substitute data to an envelope without changing its outcome.
    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// `true` when `data` is a local fixture rather than a server response.
    pub fn is_fallback(&self) -> bool {
        self.success && self.not_implemented
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            not_implemented: self.not_implemented,
        }
    }

    /// Collapse into a plain `Result`, discarding the fallback flag.
    ///
    /// A successful envelope without data (should not happen for gateway
    /// operations) becomes an error so callers never see a silent `None`.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err("response contained no data".into()),
            (false, _) => Err(self.error.unwrap_or_else(|| "request failed".into())),
        }
    }
}

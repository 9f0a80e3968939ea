use thiserror::Error;

/// Top-level error type for the `vayu-api` crate.
///
/// These never cross the public operation boundary directly: every
/// `VayuClient` endpoint folds them into an [`ApiResult`](crate::ApiResult).
/// They stay public so the transport helpers and `vayu-core` can classify
/// failures without string matching.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),

    // ── Server ──────────────────────────────────────────────────────
    /// The server answered `501 Not Implemented`.
    #[error("Endpoint not implemented: {path}")]
    NotImplemented { path: String },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request never produced an HTTP response
    /// (unreachable host, refused connection, timeout).
    ///
    /// The dashboard snapshot and device list substitute their fallback
    /// fixtures only for these failures.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the server signalled `501 Not Implemented`.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented { .. })
    }

    /// HTTP status code, when the failure came with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::NotImplemented { .. } => Some(501),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_counts_as_transport() {
        assert!(Error::Timeout { timeout_secs: 10 }.is_transport());
    }

    #[test]
    fn http_status_is_not_transport() {
        let err = Error::Http {
            status: 500,
            message: "boom".into(),
        };
        assert!(!err.is_transport());
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn not_implemented_reports_501() {
        let err = Error::NotImplemented {
            path: "/api/v1/dashboard/analytics/X".into(),
        };
        assert!(err.is_not_implemented());
        assert_eq!(err.status(), Some(501));
    }
}

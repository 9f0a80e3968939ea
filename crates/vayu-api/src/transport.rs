// Shared transport configuration for building reqwest::Client instances.
//
// Keeps timeout and user-agent settings in one place so every consumer
// (core resources, CLI) builds an identically configured client.

use std::time::Duration;

use crate::error::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("vayu/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound for a single request, connect through body.
    pub timeout: Duration,
    /// Optional connect-phase bound, tighter than `timeout`.
    pub connect_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if let Some(connect) = self.connect_timeout {
            builder = builder.connect_timeout(connect);
        }

        builder
            .build()
            .map_err(|e| Error::Client(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(TransportConfig::default().timeout, Duration::from_secs(10));
    }

    #[test]
    fn builds_client_with_custom_timeout() {
        let config = TransportConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert!(config.build_client().is_ok());
    }
}

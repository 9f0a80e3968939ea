// ── Runtime synchronization configuration ──
//
// Describes *where* the API lives and *how often* to poll it. Never touches
// disk or the environment: `vayu-config` builds one and hands it in.

use std::time::Duration;

use url::Url;
use vayu_api::{TransportConfig, VayuClient};

use crate::error::CoreError;
use crate::model::DeviceId;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_HISTORY_POLL_INTERVAL: Duration = Duration::from_millis(30_000);
pub const DEFAULT_DEVICE_ID: &str = "ESP32_001";
pub const DEFAULT_TIMEOUT: Duration = vayu_api::transport::DEFAULT_TIMEOUT;

/// Configuration for synchronizing with one Vayu backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// API base URL (e.g. `http://localhost:8000`).
    pub api_base_url: Url,
    /// Dashboard snapshot polling cadence.
    pub poll_interval: Duration,
    /// Cadence for historical data when continuous polling is requested.
    pub history_poll_interval: Duration,
    /// Device selected when the consumer names none.
    pub default_device: Option<DeviceId>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Default cadences, timeout and device for the backend at `api_base_url`.
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            history_poll_interval: DEFAULT_HISTORY_POLL_INTERVAL,
            default_device: DeviceId::parse(DEFAULT_DEVICE_ID),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reject zero durations before any `Poller` sees them.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("poll_interval", self.poll_interval),
            ("history_poll_interval", self.history_poll_interval),
            ("timeout", self.timeout),
        ] {
            if value.is_zero() {
                return Err(CoreError::Config {
                    message: format!("{field} must be greater than zero"),
                });
            }
        }
        Ok(())
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default().with_timeout(self.timeout)
    }

    /// Build the gateway client. One instance is meant to be shared by
    /// every resource via `Arc`.
    pub fn client(&self) -> Result<VayuClient, CoreError> {
        self.validate()?;
        Ok(VayuClient::new(self.api_base_url.clone(), &self.transport())?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn local() -> SyncConfig {
        SyncConfig::new(Url::parse(DEFAULT_API_BASE_URL).unwrap())
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = local();
        assert_eq!(cfg.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(cfg.poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.history_poll_interval, Duration::from_secs(30));
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(
            cfg.default_device.as_ref().map(DeviceId::as_str),
            Some("ESP32_001")
        );
    }

    #[test]
    fn zero_interval_is_rejected() {
        let cfg = SyncConfig {
            poll_interval: Duration::ZERO,
            ..local()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));
        assert!(cfg.client().is_err());
    }
}

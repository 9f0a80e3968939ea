// ── Resources ──
//
// Each resource owns one `ResourceState`, drives the gateway for it, and
// publishes every transition through a `watch` channel. Remote failures
// end up in `ResourceState::error`; nothing here returns them as `Err`.

mod dashboard;
mod fan;
mod historical;

use std::time::Duration;

pub use dashboard::DashboardResource;
pub use fan::FanControl;
pub use historical::HistoricalResource;

/// Error surfaced when an operation needs a device and none is selected.
pub const NO_DEVICE_MESSAGE: &str = "No device ID provided";
/// Error surfaced by a historical fetch with a missing device or range.
pub const MISSING_INPUT_MESSAGE: &str = "Device ID and time range are required";
/// Error surfaced by a fan override outside 0-100.
pub const INTENSITY_MESSAGE: &str = "Fan intensity must be between 0 and 100";

/// Whether `error` was produced by local input checks, in which case the
/// gateway was never called.
pub fn is_input_error(error: &str) -> bool {
    matches!(
        error,
        NO_DEVICE_MESSAGE | MISSING_INPUT_MESSAGE | INTENSITY_MESSAGE
    )
}

/// Whether a historical resource re-fetches on a schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollMode {
    /// Fetch on construction and whenever an input changes.
    #[default]
    Off,
    /// Additionally re-fetch every interval while a device is selected.
    Continuous(Duration),
}

impl PollMode {
    /// Continuous polling at [`HistoricalResource::DEFAULT_POLL_INTERVAL`].
    pub fn continuous() -> Self {
        Self::Continuous(crate::config::DEFAULT_HISTORY_POLL_INTERVAL)
    }

    pub fn interval(self) -> Option<Duration> {
        match self {
            Self::Off => None,
            Self::Continuous(interval) => Some(interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_recognized() {
        assert!(is_input_error(NO_DEVICE_MESSAGE));
        assert!(is_input_error(INTENSITY_MESSAGE));
        assert!(!is_input_error("HTTP 500: Internal Server Error"));
    }

    #[test]
    fn poll_mode_interval() {
        assert_eq!(PollMode::Off.interval(), None);
        assert_eq!(
            PollMode::continuous().interval(),
            Some(Duration::from_secs(30))
        );
    }
}

// ── Gateway seam ──
//
// The subset of the remote API that resources drive. `VayuClient` is the
// production implementation; tests substitute a scripted fake.

use std::future::Future;

use vayu_api::models::{DashboardSnapshot, HistoricalWindow};
use vayu_api::{ApiResult, VayuClient};

/// Remote operations the resources depend on.
///
/// Implementations must be stateless between calls (or internally
/// synchronized): one instance is shared by every resource.
pub trait Gateway: Send + Sync + 'static {
    fn fetch_dashboard(
        &self,
        device_id: &str,
    ) -> impl Future<Output = ApiResult<DashboardSnapshot>> + Send;

    fn fetch_historical(
        &self,
        device_id: &str,
        hours: u32,
    ) -> impl Future<Output = ApiResult<HistoricalWindow>> + Send;

    fn apply_fan_override(
        &self,
        device_id: &str,
        fan_on: bool,
        intensity: u8,
    ) -> impl Future<Output = ApiResult<serde_json::Value>> + Send;

    fn release_fan_override(
        &self,
        device_id: &str,
    ) -> impl Future<Output = ApiResult<serde_json::Value>> + Send;
}

impl Gateway for VayuClient {
    fn fetch_dashboard(
        &self,
        device_id: &str,
    ) -> impl Future<Output = ApiResult<DashboardSnapshot>> + Send {
        self.dashboard(device_id)
    }

    fn fetch_historical(
        &self,
        device_id: &str,
        hours: u32,
    ) -> impl Future<Output = ApiResult<HistoricalWindow>> + Send {
        self.historical(device_id, hours)
    }

    fn apply_fan_override(
        &self,
        device_id: &str,
        fan_on: bool,
        intensity: u8,
    ) -> impl Future<Output = ApiResult<serde_json::Value>> + Send {
        self.set_fan_override(device_id, fan_on, intensity)
    }

    fn release_fan_override(
        &self,
        device_id: &str,
    ) -> impl Future<Output = ApiResult<serde_json::Value>> + Send {
        self.clear_fan_override(device_id)
    }
}

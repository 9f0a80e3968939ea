// Sensor endpoints
//
// Status, recent history by count, and historical windows by hours.
// Both history variants share one route, distinguished by query param.

use crate::client::{VayuClient, settle};
use crate::envelope::ApiResult;
use crate::models::{HistoricalWindow, RawReading, SensorHistoryResponse};

/// Default row count for [`VayuClient::sensor_history`].
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

impl VayuClient {
    /// Sensor health for one device.
    ///
    /// `GET /api/v1/sensor/status/{device_id}`
    pub async fn sensor_status(&self, device_id: &str) -> ApiResult<serde_json::Value> {
        let url = self.endpoint(&["api", "v1", "sensor", "status", device_id]);
        settle(self.get(url, &[]).await, "Sensor status")
    }

    /// The last `limit` readings.
    ///
    /// `GET /api/v1/sensor/history/{device_id}?limit=N` → `readings` (or `[]`).
    pub async fn sensor_history(&self, device_id: &str, limit: u32) -> ApiResult<Vec<RawReading>> {
        let url = self.endpoint(&["api", "v1", "sensor", "history", device_id]);
        settle(
            self.get::<SensorHistoryResponse>(url, &[("limit", limit.to_string())])
                .await
                .map(|r| r.readings.unwrap_or_default()),
            "Sensor history",
        )
    }

    /// Readings from the last `hours`, oldest first.
    ///
    /// `GET /api/v1/sensor/history/{device_id}?hours=N`
    pub async fn historical(&self, device_id: &str, hours: u32) -> ApiResult<HistoricalWindow> {
        let url = self.endpoint(&["api", "v1", "sensor", "history", device_id]);
        settle(
            self.get(url, &[("hours", hours.to_string())]).await,
            "Historical data",
        )
    }
}

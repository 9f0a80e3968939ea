// Control endpoints
//
// Manual fan override and actuator status.

use tracing::debug;

use crate::client::{VayuClient, settle};
use crate::envelope::ApiResult;
use crate::models::ControlStatus;

impl VayuClient {
    /// Force the fan on/off at `intensity` percent, suspending auto mode.
    ///
    /// `POST /api/v1/control/override?device_id=&fan_on=&fan_intensity=`
    ///
    /// Parameters travel in the query string; the body is empty.
    pub async fn set_fan_override(
        &self,
        device_id: &str,
        fan_on: bool,
        intensity: u8,
    ) -> ApiResult<serde_json::Value> {
        let url = self.endpoint(&["api", "v1", "control", "override"]);
        debug!(device_id, fan_on, intensity, "setting fan override");
        settle(
            self.post(
                url,
                &[
                    ("device_id", device_id.to_owned()),
                    ("fan_on", fan_on.to_string()),
                    ("fan_intensity", intensity.to_string()),
                ],
            )
            .await,
            "Fan override",
        )
    }

    /// Return the fan to automatic control.
    ///
    /// `DELETE /api/v1/control/override/{device_id}`
    pub async fn clear_fan_override(&self, device_id: &str) -> ApiResult<serde_json::Value> {
        let url = self.endpoint(&["api", "v1", "control", "override", device_id]);
        debug!(device_id, "clearing fan override");
        settle(self.delete(url).await, "Fan override")
    }

    /// Current actuator state.
    ///
    /// `GET /api/v1/control/status/{device_id}`
    pub async fn control_status(&self, device_id: &str) -> ApiResult<ControlStatus> {
        let url = self.endpoint(&["api", "v1", "control", "status", device_id]);
        settle(self.get(url, &[]).await, "Control status")
    }
}

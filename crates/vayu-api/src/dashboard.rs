// Dashboard endpoints
//
// Health probe, per-device snapshot, device registry, blockchain log
// and analytics. The snapshot and device list degrade to local fixtures
// when the backend is unreachable.

use tracing::debug;

use crate::client::{VayuClient, settle, settle_or_fallback};
use crate::envelope::ApiResult;
use crate::fixtures;
use crate::models::{
    BlockchainLog, BlockchainLogsResponse, DashboardSnapshot, DeviceListResponse, HealthStatus,
};

/// Default page size for [`VayuClient::blockchain_logs`].
pub const DEFAULT_LOG_LIMIT: u32 = 20;
/// Default window for [`VayuClient::analytics`].
pub const DEFAULT_ANALYTICS_HOURS: u32 = 24;

impl VayuClient {
    /// Check backend liveness.
    ///
    /// `GET /health`
    pub async fn health_check(&self) -> ApiResult<HealthStatus> {
        let url = self.endpoint(&["health"]);
        settle(self.get(url, &[]).await, "Health")
    }

    /// Full dashboard snapshot for one device.
    ///
    /// `GET /api/v1/dashboard/data/{device_id}`
    ///
    /// Unreachable backend → fallback fixture (success, `notImplemented`).
    /// `501` → failure flagged `notImplemented`, still carrying the fixture
    /// so consumers have something to render.
    pub async fn dashboard(&self, device_id: &str) -> ApiResult<DashboardSnapshot> {
        let url = self.endpoint(&["api", "v1", "dashboard", "data", device_id]);
        debug!(device_id, "fetching dashboard snapshot");
        let res = settle_or_fallback(
            self.get(url, &[]).await,
            "Dashboard",
            fixtures::dashboard_snapshot,
        );
        if res.not_implemented && !res.success {
            res.with_data(fixtures::dashboard_snapshot())
        } else {
            res
        }
    }

    /// Ids of every registered device.
    ///
    /// `GET /api/v1/dashboard/devices` → `devices` (or `[]`).
    pub async fn devices(&self) -> ApiResult<Vec<String>> {
        let url = self.endpoint(&["api", "v1", "dashboard", "devices"]);
        settle_or_fallback(
            self.get::<DeviceListResponse>(url, &[])
                .await
                .map(|r| r.devices),
            "Devices",
            fixtures::device_list,
        )
    }

    /// Most recent blockchain log entries.
    ///
    /// `GET /api/v1/dashboard/blockchain/logs?limit=N` → `logs` (or `[]`).
    pub async fn blockchain_logs(&self, limit: u32) -> ApiResult<Vec<BlockchainLog>> {
        let url = self.endpoint(&["api", "v1", "dashboard", "blockchain", "logs"]);
        settle(
            self.get::<BlockchainLogsResponse>(url, &[("limit", limit.to_string())])
                .await
                .map(|r| r.logs.unwrap_or_default()),
            "Blockchain logs",
        )
    }

    /// Aggregated analytics over the last `hours`.
    ///
    /// `GET /api/v1/dashboard/analytics/{device_id}?hours=N`
    ///
    /// Returns loosely-typed JSON; the backend has not settled its shape.
    pub async fn analytics(&self, device_id: &str, hours: u32) -> ApiResult<serde_json::Value> {
        let url = self.endpoint(&["api", "v1", "dashboard", "analytics", device_id]);
        settle(
            self.get(url, &[("hours", hours.to_string())]).await,
            "Analytics",
        )
    }
}

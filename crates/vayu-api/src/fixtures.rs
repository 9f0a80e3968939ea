// ── Fallback fixtures ──
//
// Static payloads substituted when the API is unreachable, so consumers
// always have something to render offline. Timestamps are stamped at call
// time; everything else is fixed.

use chrono::Utc;
use serde_json::json;

use crate::models::{
    BlockchainLog, Classification, ControlStatus, DashboardSnapshot, Fault, Prediction,
    SensorReading,
};

/// Device id used by the fixture payloads.
pub const FIXTURE_DEVICE_ID: &str = "ESP32_001";

/// Dashboard snapshot served when the backend cannot be reached.
pub fn dashboard_snapshot() -> DashboardSnapshot {
    let now = Utc::now();

    DashboardSnapshot {
        current_reading: Some(SensorReading {
            device_id: Some(FIXTURE_DEVICE_ID.into()),
            pm25: Some(14.5),
            co2: Some(850.0),
            co: Some(2.1),
            voc: Some(120.0),
            timestamp: Some(now),
        }),
        prediction: Some(Prediction {
            smoke_detected: Some(false),
            will_peak: Some(false),
            confidence: Some(0.98),
            estimated_peak_value: None,
            estimated_time: Some("None".into()),
            reasoning: None,
        }),
        classification: Some(Classification {
            air_type: Some("clean".into()),
            label: Some("Clean Air".into()),
            confidence: Some(0.99),
            reasoning: None,
        }),
        recent_faults: vec![Fault {
            id: Some(json!(1)),
            fault_type: Some("none".into()),
            message: Some("System healthy".into()),
            severity: Some("low".into()),
            affected_sensor: None,
            details: None,
            timestamp: Some(now),
        }],
        control_status: Some(ControlStatus {
            fan_on: false,
            fan_intensity: 0.0,
            auto_mode: Some(true),
            manual_override: None,
            extra: serde_json::Map::new(),
        }),
        recent_logs: vec![
            BlockchainLog {
                id: Some("0xabc123".into()),
                event_type: "decision".into(),
                device_id: Some(FIXTURE_DEVICE_ID.into()),
                hash: Some("0x7d2e9f3b1c5a8d4e9f3b1c5a8d4e9f3b1c5a8d4e".into()),
                timestamp: Some(now),
                data: json!({
                    "detail": "Air quality optimized",
                    "action": "Fan Speed Adjusted"
                }),
            },
            BlockchainLog {
                id: Some("0xdef456".into()),
                event_type: "healing".into(),
                device_id: Some(FIXTURE_DEVICE_ID.into()),
                hash: Some("0x3a1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b".into()),
                timestamp: Some(now),
                data: json!({
                    "issue": "Sensor jitter detected",
                    "resolution": "Auto-calibration applied"
                }),
            },
        ],
    }
}

/// Device list served when the backend cannot be reached.
pub fn device_list() -> Vec<String> {
    vec![FIXTURE_DEVICE_ID.into(), "ESP32_002".into()]
}

// Endpoint schemas for the Vayu REST API.
//
// The backend is loosely specified, so optional fields default rather than
// fail and one malformed row never rejects the whole payload. Timestamps
// accept RFC 3339, naive ISO-8601 (read as UTC) and epoch milliseconds; an
// unparseable timestamp on an embedded record becomes `None`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Timestamp handling ──────────────────────────────────────────────

/// Parse a server timestamp.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`, `...+05:30`) and naive
/// ISO-8601 with or without fractional seconds, which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Interpret a JSON timestamp: a string as for [`parse_timestamp`], a
/// number as epoch milliseconds.
pub fn timestamp_from_value(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(timestamp_from_value))
}

/// Record ids arrive as strings or integers depending on the backend store.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Health ──────────────────────────────────────────────────────────

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

// ── Dashboard ───────────────────────────────────────────────────────

/// Latest sensor sample for a device.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub co2: Option<f64>,
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub voc: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Smoke / pollution peak forecast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub smoke_detected: Option<bool>,
    #[serde(default)]
    pub will_peak: Option<bool>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub estimated_peak_value: Option<f64>,
    #[serde(default)]
    pub estimated_time: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Pollution source classification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Classification {
    #[serde(default, alias = "type")]
    pub air_type: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// A detected sensor fault and its self-healing context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fault {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, alias = "type")]
    pub fault_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub affected_sensor: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Fan actuator state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fan_on: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fan_intensity: f64,
    #[serde(default)]
    pub auto_mode: Option<bool>,
    #[serde(default)]
    pub manual_override: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An entry of the append-only blockchain event log.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockchainLog {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: Value,
}

/// `GET /api/v1/dashboard/data/{device_id}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub current_reading: Option<SensorReading>,
    #[serde(default)]
    pub prediction: Option<Prediction>,
    #[serde(default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub recent_faults: Vec<Fault>,
    #[serde(default)]
    pub control_status: Option<ControlStatus>,
    #[serde(default)]
    pub recent_logs: Vec<BlockchainLog>,
}

/// A device list entry: either a bare id or a record carrying one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DeviceEntry {
    Id(String),
    Record { device_id: String },
}

impl From<DeviceEntry> for String {
    fn from(entry: DeviceEntry) -> Self {
        match entry {
            DeviceEntry::Id(id) | DeviceEntry::Record { device_id: id } => id,
        }
    }
}

fn device_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<Vec<DeviceEntry>> = Option::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect())
}

/// `GET /api/v1/dashboard/devices`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DeviceListResponse {
    #[serde(default, deserialize_with = "device_ids")]
    pub devices: Vec<String>,
}

/// `GET /api/v1/dashboard/blockchain/logs`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BlockchainLogsResponse {
    #[serde(default)]
    pub logs: Option<Vec<BlockchainLog>>,
}

// ── Sensor history ──────────────────────────────────────────────────

/// A history row exactly as the server sends it.
///
/// The timestamp stays raw JSON here so a bad value only affects its own
/// row; `vayu-core` normalizes it into epoch milliseconds together with a
/// display form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawReading {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub pm25: Option<f64>,
    #[serde(default)]
    pub co2: Option<f64>,
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub voc: Option<f64>,
}

impl RawReading {
    /// The row's instant, if its timestamp is usable.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_ref().and_then(timestamp_from_value)
    }

    /// The timestamp as sent, for display and logs.
    pub fn timestamp_text(&self) -> String {
        match &self.timestamp {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "-".into(),
        }
    }
}

/// `GET /api/v1/sensor/history/{device_id}?limit=N`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SensorHistoryResponse {
    #[serde(default)]
    pub readings: Option<Vec<RawReading>>,
}

/// `GET /api/v1/sensor/history/{device_id}?hours=N`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoricalWindow {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub readings: Vec<RawReading>,
    #[serde(default)]
    pub time_range_hours: Option<u32>,
    #[serde(default)]
    pub total_readings: Option<u64>,
}

// ── Domain model ──
//
// View-ready shapes produced from gateway payloads.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use vayu_api::models::{HistoricalWindow, RawReading};

// ── DeviceId ────────────────────────────────────────────────────────

/// Opaque key naming one sensor unit. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceId(String);

impl DeviceId {
    /// Accept any non-blank string, trimmed.
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeviceId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "device id must not be empty".to_owned())
    }
}

impl From<DeviceId> for String {
    fn from(id: DeviceId) -> Self {
        id.0
    }
}

// ── Historical readings ─────────────────────────────────────────────

/// One chart-ready sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalReading {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub pm25: Option<f64>,
    pub co2: Option<f64>,
    pub co: Option<f64>,
    pub voc: Option<f64>,
    /// Wall-clock label, e.g. `"09:05 PM"`.
    pub formatted_time: String,
}

impl HistoricalReading {
    /// Normalize a raw row using the local time zone for `formatted_time`.
    pub fn from_raw(raw: &RawReading) -> Option<Self> {
        Self::from_raw_in(raw, &Local)
    }

    /// Normalize a raw row, labelling it in `tz`.
    ///
    /// Returns `None` when the timestamp cannot be parsed.
    pub fn from_raw_in<Tz: TimeZone>(raw: &RawReading, tz: &Tz) -> Option<Self>
    where
        Tz::Offset: fmt::Display,
    {
        let at = raw.time()?;
        Some(Self {
            timestamp: at.timestamp_millis(),
            pm25: raw.pm25,
            co2: raw.co2,
            co: raw.co,
            voc: raw.voc,
            formatted_time: clock_label(&at.with_timezone(tz)),
        })
    }
}

/// Two-digit 12-hour clock, en-US style: `"12:00 AM"`.
pub fn clock_label<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%I:%M %p").to_string()
}

/// A normalized historical window, ordered as the server returned it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSeries {
    pub readings: Vec<HistoricalReading>,
    pub time_range_hours: Option<u32>,
    pub total_readings: Option<u64>,
}

impl HistoricalSeries {
    pub fn from_window(window: &HistoricalWindow) -> Self {
        Self::from_window_in(window, &Local)
    }

    /// Rows with unparseable timestamps are dropped.
    pub fn from_window_in<Tz: TimeZone>(window: &HistoricalWindow, tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let readings = window
            .readings
            .iter()
            .filter_map(|raw| {
                let reading = HistoricalReading::from_raw_in(raw, tz);
                if reading.is_none() {
                    warn!(timestamp = %raw.timestamp_text(), "dropping reading with invalid timestamp");
                }
                reading
            })
            .collect();

        Self {
            readings,
            time_range_hours: window.time_range_hours,
            total_readings: window.total_readings,
        }
    }

    /// Newest sample, if any.
    pub fn latest(&self) -> Option<&HistoricalReading> {
        self.readings.last()
    }

    /// Time span covered, first to last sample.
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = Utc.timestamp_millis_opt(self.readings.first()?.timestamp).single()?;
        let last = Utc.timestamp_millis_opt(self.readings.last()?.timestamp).single()?;
        Some((first, last))
    }
}

// Test support: a scripted gateway and a scheduler-draining helper.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use vayu_api::ApiResult;
use vayu_api::models::{DashboardSnapshot, HistoricalWindow, RawReading, SensorReading};

use crate::gateway::Gateway;

/// Let spawned tasks run to their next suspension point.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

struct Scripted<T> {
    result: ApiResult<T>,
    delay: Duration,
}

/// Replies from a queue; once empty, repeats the fallback reply.
struct Script<T> {
    queue: VecDeque<Scripted<T>>,
    fallback: ApiResult<T>,
}

impl<T: Clone> Script<T> {
    fn new(fallback: ApiResult<T>) -> Self {
        Self {
            queue: VecDeque::new(),
            fallback,
        }
    }

    fn next(&mut self) -> Scripted<T> {
        self.queue.pop_front().unwrap_or_else(|| Scripted {
            result: self.fallback.clone(),
            delay: Duration::ZERO,
        })
    }
}

async fn reply<T>(scripted: Scripted<T>) -> ApiResult<T> {
    if !scripted.delay.is_zero() {
        tokio::time::sleep(scripted.delay).await;
    }
    scripted.result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Dashboard(String),
    Historical(String, u32),
    SetOverride(String, bool, u8),
    ClearOverride(String),
}

/// In-memory `Gateway` with per-operation reply scripts and a call log.
pub(crate) struct FakeGateway {
    dashboard: Mutex<Script<DashboardSnapshot>>,
    historical: Mutex<Script<HistoricalWindow>>,
    fan: Mutex<Script<Value>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    /// Every operation fails with `"unscripted"` until told otherwise.
    pub(crate) fn new() -> Self {
        Self {
            dashboard: Mutex::new(Script::new(ApiResult::failure("unscripted"))),
            historical: Mutex::new(Script::new(ApiResult::failure("unscripted"))),
            fan: Mutex::new(Script::new(ApiResult::failure("unscripted"))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push_dashboard(&self, result: ApiResult<DashboardSnapshot>, delay: Duration) {
        self.dashboard
            .lock()
            .unwrap()
            .queue
            .push_back(Scripted { result, delay });
    }

    pub(crate) fn always_dashboard(&self, result: ApiResult<DashboardSnapshot>) {
        self.dashboard.lock().unwrap().fallback = result;
    }

    pub(crate) fn push_historical(&self, result: ApiResult<HistoricalWindow>, delay: Duration) {
        self.historical
            .lock()
            .unwrap()
            .queue
            .push_back(Scripted { result, delay });
    }

    pub(crate) fn always_historical(&self, result: ApiResult<HistoricalWindow>) {
        self.historical.lock().unwrap().fallback = result;
    }

    pub(crate) fn always_fan(&self, result: ApiResult<Value>) {
        self.fan.lock().unwrap().fallback = result;
    }

    pub(crate) fn push_fan(&self, result: ApiResult<Value>, delay: Duration) {
        self.fan
            .lock()
            .unwrap()
            .queue
            .push_back(Scripted { result, delay });
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Gateway for FakeGateway {
    fn fetch_dashboard(
        &self,
        device_id: &str,
    ) -> impl Future<Output = ApiResult<DashboardSnapshot>> + Send {
        self.record(Call::Dashboard(device_id.to_owned()));
        reply(self.dashboard.lock().unwrap().next())
    }

    fn fetch_historical(
        &self,
        device_id: &str,
        hours: u32,
    ) -> impl Future<Output = ApiResult<HistoricalWindow>> + Send {
        self.record(Call::Historical(device_id.to_owned(), hours));
        reply(self.historical.lock().unwrap().next())
    }

    fn apply_fan_override(
        &self,
        device_id: &str,
        fan_on: bool,
        intensity: u8,
    ) -> impl Future<Output = ApiResult<Value>> + Send {
        self.record(Call::SetOverride(device_id.to_owned(), fan_on, intensity));
        reply(self.fan.lock().unwrap().next())
    }

    fn release_fan_override(&self, device_id: &str) -> impl Future<Output = ApiResult<Value>> + Send {
        self.record(Call::ClearOverride(device_id.to_owned()));
        reply(self.fan.lock().unwrap().next())
    }
}

// ── Payload builders ────────────────────────────────────────────────

/// A snapshot distinguishable by its PM2.5 value.
pub(crate) fn snapshot(pm25: f64) -> DashboardSnapshot {
    DashboardSnapshot {
        current_reading: Some(SensorReading {
            device_id: Some("ESP32_001".into()),
            pm25: Some(pm25),
            ..SensorReading::default()
        }),
        ..DashboardSnapshot::default()
    }
}

pub(crate) fn pm25_of(snapshot: &DashboardSnapshot) -> Option<f64> {
    snapshot.current_reading.as_ref()?.pm25
}

/// A window of readings one minute apart, starting 2024-01-01T00:00:00Z.
pub(crate) fn window(pm25: &[f64]) -> HistoricalWindow {
    let readings = pm25
        .iter()
        .enumerate()
        .map(|(i, value)| RawReading {
            timestamp: Some(format!("2024-01-01T00:{i:02}:00Z").into()),
            pm25: Some(*value),
            ..RawReading::default()
        })
        .collect();
    HistoricalWindow {
        device_id: Some("ESP32_001".into()),
        readings,
        time_range_hours: Some(24),
        total_readings: Some(u64::try_from(pm25.len()).unwrap()),
    }
}

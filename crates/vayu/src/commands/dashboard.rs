//! Dashboard snapshot: one-shot view and the `watch` poll loop.

use std::sync::Arc;
use std::time::Duration;

use strum::IntoEnumIterator;
use tabled::Tabled;
use vayu_core::format::{
    Pollutant, RiskLevel, SystemHealth, air_type_label, format_confidence, format_timestamp,
};
use vayu_core::{DashboardResource, DashboardSnapshot};

use crate::cli::WatchArgs;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Rendering ────────────────────────────────────────────────────────

#[derive(Tabled)]
struct PollutantRow {
    #[tabled(rename = "Pollutant")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: &'static str,
    #[tabled(rename = "Level")]
    level: String,
}

fn pollutant_rows(snapshot: &DashboardSnapshot, color: bool) -> Vec<PollutantRow> {
    let reading = snapshot.current_reading.clone().unwrap_or_default();
    Pollutant::iter()
        .map(|p| {
            let value = p.value_in(&reading);
            PollutantRow {
                name: p.into(),
                value: value.map_or_else(|| "-".into(), |v| format!("{v:.1}")),
                unit: p.unit(),
                level: value.map_or_else(|| "-".into(), |v| output::paint_level(p.level(v), color)),
            }
        })
        .collect()
}

/// Full detail view of one snapshot.
pub fn detail(snapshot: &DashboardSnapshot, color: bool) -> String {
    let reading = snapshot.current_reading.as_ref();
    let mut lines = vec![
        format!(
            "Device:     {}",
            reading
                .and_then(|r| r.device_id.as_deref())
                .unwrap_or("-")
        ),
        format!(
            "Updated:    {}",
            format_timestamp(reading.and_then(|r| r.timestamp.as_ref()))
        ),
        output::render_table(&pollutant_rows(snapshot, color)),
    ];

    let risk = RiskLevel::from_prediction(snapshot.prediction.as_ref());
    let mut forecast = output::paint_risk(risk, color);
    if let Some(p) = &snapshot.prediction {
        if let Some(peak) = p.estimated_peak_value {
            forecast.push_str(&format!(
                " (peak {peak:.1} at {}, {} confidence)",
                p.estimated_time.as_deref().unwrap_or("-"),
                format_confidence(p.confidence)
            ));
        }
    }
    lines.push(format!("Forecast:   {forecast}"));

    if let Some(c) = &snapshot.classification {
        lines.push(format!(
            "Source:     {} ({})",
            air_type_label(c.air_type.as_deref()),
            format_confidence(c.confidence)
        ));
    }

    let health = SystemHealth::from_faults(&snapshot.recent_faults);
    lines.push(format!(
        "Health:     {} ({} recent faults)",
        output::paint_health(health, color),
        snapshot.recent_faults.len()
    ));
    for fault in &snapshot.recent_faults {
        lines.push(format!(
            "  - [{}] {}",
            fault.severity.as_deref().unwrap_or("?"),
            fault.message.as_deref().unwrap_or("-")
        ));
    }

    if let Some(fan) = &snapshot.control_status {
        let mode = if fan.manual_override == Some(true) {
            "manual override"
        } else {
            "auto"
        };
        lines.push(format!(
            "Fan:        {} at {:.0}% ({mode})",
            if fan.fan_on { "ON" } else { "OFF" },
            fan.fan_intensity
        ));
    }
    lines.push(format!("Logs:       {} recent entries", snapshot.recent_logs.len()));
    lines.join("\n")
}

/// One-line summary for plain output.
fn summary(snapshot: &DashboardSnapshot) -> String {
    let reading = snapshot.current_reading.clone().unwrap_or_default();
    Pollutant::iter()
        .map(|p| {
            let key: &'static str = p.into();
            let value = p
                .value_in(&reading)
                .map_or_else(|| "-".into(), |v| format!("{v:.1}"));
            format!("{}={value}", key.to_lowercase().replace('.', ""))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render(session: &Session, snapshot: &DashboardSnapshot) -> String {
    output::render_single(session.output, snapshot, |s| detail(s, session.color), summary)
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session) -> Result<(), CliError> {
    let device = util::require_device(session)?;
    let spinner = util::spinner(session, "Fetching dashboard");
    let envelope = session.client.dashboard(device.as_str()).await;
    util::finish(spinner);

    util::present(session, "Dashboard", &envelope, |snapshot| render(session, snapshot))
}

/// Poll the snapshot and print each settled update.
pub async fn watch(session: &Session, args: WatchArgs) -> Result<(), CliError> {
    let interval = args
        .interval
        .map_or(session.sync.poll_interval, Duration::from);
    let resource = DashboardResource::new(Arc::clone(&session.client), session.device(), interval)?;
    tracing::info!(device = ?resource.device(), ?interval, "watching dashboard");

    util::follow(session, resource.subscribe(), args.count, |snapshot| {
        render(session, snapshot)
    })
    .await
}

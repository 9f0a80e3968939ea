//! Historical readings, one-shot or followed.

use std::sync::Arc;

use tabled::Tabled;
use vayu_core::{HistoricalReading, HistoricalResource, HistoricalSeries, PollMode};

use crate::cli::{HistoryArgs, OutputFormat};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "PM2.5")]
    pm25: String,
    #[tabled(rename = "CO2")]
    co2: String,
    #[tabled(rename = "CO")]
    co: String,
    #[tabled(rename = "VOC")]
    voc: String,
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.1}"))
}

impl From<&HistoricalReading> for ReadingRow {
    fn from(r: &HistoricalReading) -> Self {
        Self {
            time: r.formatted_time.clone(),
            pm25: cell(r.pm25),
            co2: cell(r.co2),
            co: cell(r.co),
            voc: cell(r.voc),
        }
    }
}

/// Table or plain view of a window; JSON goes through serde directly.
fn render(format: OutputFormat, series: &HistoricalSeries) -> String {
    let out = output::render_list(format, &series.readings, |r| ReadingRow::from(r), |r| {
        format!("{} {}", r.timestamp, cell(r.pm25))
    });
    if format != OutputFormat::Table {
        return out;
    }
    let total = series
        .total_readings
        .map_or_else(|| series.readings.len().to_string(), |n| n.to_string());
    let hours = series
        .time_range_hours
        .map_or_else(|| "?".into(), |h| h.to_string());
    format!("{out}\n{total} readings over {hours}h")
}

pub async fn handle(session: &Session, args: HistoryArgs) -> Result<(), CliError> {
    let mode = if args.follow {
        PollMode::Continuous(session.sync.history_poll_interval)
    } else {
        PollMode::Off
    };
    let resource =
        HistoricalResource::new(Arc::clone(&session.client), session.device(), args.hours, mode)?;
    if args.follow {
        return util::follow(session, resource.subscribe(), args.count, |series| {
            render(session.output, series)
        })
        .await;
    }

    let spinner = util::spinner(session, "Fetching history");
    let settled = resource.subscribe().wait_for(|s| !s.loading).await;
    util::finish(spinner);
    let state = settled.unwrap_or_else(|| resource.state());

    if let Some(error) = &state.error {
        return Err(CliError::from_envelope(
            "History",
            error,
            state.not_implemented,
            &session.url(),
        ));
    }
    if let Some(series) = &state.data {
        let out = output::render_single(
            session.output,
            series.as_ref(),
            |s| render(OutputFormat::Table, s),
            |s| render(OutputFormat::Plain, s),
        );
        output::print_output(&out, session.quiet);
    }
    Ok(())
}

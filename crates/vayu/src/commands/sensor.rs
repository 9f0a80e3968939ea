//! Raw sensor endpoints.

use tabled::Tabled;
use vayu_api::models::RawReading;
use vayu_core::format::format_timestamp;

use crate::cli::{SensorArgs, SensorCommand};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RawRow {
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

impl From<&RawReading> for RawRow {
    fn from(r: &RawReading) -> Self {
        let time = match r.time() {
            Some(at) => format_timestamp(Some(&at)),
            None => r.timestamp_text(),
        };
        Self {
            time,
            pm25: cell(r.pm25),
            co2: cell(r.co2),
            co: cell(r.co),
            voc: cell(r.voc),
        }
    }
}

pub async fn handle(session: &Session, args: SensorArgs) -> Result<(), CliError> {
    let device = util::require_device(session)?;

    match args.command {
        SensorCommand::Status => {
            let spinner = util::spinner(session, "Fetching sensor status");
            let envelope = session.client.sensor_status(device.as_str()).await;
            util::finish(spinner);

            util::present(session, "Sensor status", &envelope, |status| {
                // Loosely typed; pretty JSON is the detail view.
                output::render_single(session.output, status, output::render_json_pretty, |s| {
                    output::render_json_compact(s)
                })
            })
        }
        SensorCommand::Readings { limit } => {
            let spinner = util::spinner(session, "Fetching readings");
            let envelope = session.client.sensor_history(device.as_str(), limit).await;
            util::finish(spinner);

            util::present(session, "Sensor history", &envelope, |readings| {
                output::render_list(
                    session.output,
                    readings,
                    |r| RawRow::from(r),
                    |r| r.timestamp_text(),
                )
            })
        }
    }
}

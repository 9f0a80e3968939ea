//! Blockchain event log.

use tabled::Tabled;
use vayu_api::models::BlockchainLog;
use vayu_core::format::{format_timestamp, truncate_hash};

use crate::cli::LogsArgs;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Hash")]
    hash: String,
}

impl From<&BlockchainLog> for LogRow {
    fn from(log: &BlockchainLog) -> Self {
        Self {
            time: format_timestamp(log.timestamp.as_ref()),
            event: log.event_type.clone(),
            device: log.device_id.clone().unwrap_or_else(|| "-".into()),
            hash: truncate_hash(log.hash.as_deref()),
        }
    }
}

pub async fn handle(session: &Session, args: LogsArgs) -> Result<(), CliError> {
    let spinner = util::spinner(session, "Fetching logs");
    let envelope = session.client.blockchain_logs(args.limit).await;
    util::finish(spinner);

    util::present(session, "Blockchain logs", &envelope, |logs| {
        output::render_list(
            session.output,
            logs,
            |l| LogRow::from(l),
            |l| l.hash.clone().unwrap_or_default(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_truncates_hash_and_fills_gaps() {
        let log = BlockchainLog {
            event_type: "fan_override".into(),
            hash: Some("0123456789abcdef0123456789abcdef".into()),
            ..BlockchainLog::default()
        };
        let row = LogRow::from(&log);
        assert_eq!(row.hash, "01234567...89abcdef");
        assert_eq!(row.device, "-");
        assert_eq!(row.time, "N/A");
    }
}

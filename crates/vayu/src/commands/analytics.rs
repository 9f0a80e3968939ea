//! Aggregated analytics. The payload shape is not fixed, so the table
//! view is pretty JSON.

use crate::cli::AnalyticsArgs;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(session: &Session, args: AnalyticsArgs) -> Result<(), CliError> {
    let device = util::require_device(session)?;
    let spinner = util::spinner(session, "Fetching analytics");
    let envelope = session.client.analytics(device.as_str(), args.hours).await;
    util::finish(spinner);

    util::present(session, "Analytics", &envelope, |value| {
        output::render_single(session.output, value, output::render_json_pretty, |v| {
            output::render_json_compact(v)
        })
    })
}

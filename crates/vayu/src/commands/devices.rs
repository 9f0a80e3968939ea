//! Device registry listing.

use tabled::Tabled;

use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device")]
    id: String,
    #[tabled(rename = "Default")]
    default: &'static str,
}

pub async fn handle(session: &Session) -> Result<(), CliError> {
    let spinner = util::spinner(session, "Fetching devices");
    let envelope = session.client.devices().await;
    util::finish(spinner);

    let default = session.device();
    util::present(session, "Devices", &envelope, |devices| {
        output::render_list(
            session.output,
            devices,
            |id| DeviceRow {
                id: id.clone(),
                default: if default.as_ref().is_some_and(|d| d.as_str() == id) {
                    "*"
                } else {
                    ""
                },
            },
            Clone::clone,
        )
    })
}

//! Backend liveness probe.

use vayu_api::models::HealthStatus;

use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(health: &HealthStatus) -> String {
    let mut lines = vec![format!(
        "Status:   {}",
        health.status.as_deref().unwrap_or("unknown")
    )];
    for (key, value) in &health.details {
        let value = value
            .as_str()
            .map_or_else(|| value.to_string(), ToOwned::to_owned);
        lines.push(format!("{:<9} {value}", format!("{key}:")));
    }
    lines.join("\n")
}

pub async fn handle(session: &Session) -> Result<(), CliError> {
    let spinner = util::spinner(session, "Checking backend");
    let envelope = session.client.health_check().await;
    util::finish(spinner);

    util::present(session, "Health", &envelope, |health| {
        output::render_single(session.output, health, detail, |h| {
            h.status.clone().unwrap_or_else(|| "unknown".into())
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_lists_status_and_extras() {
        let health: HealthStatus =
            serde_json::from_value(json!({"status": "ok", "version": "1.2.0"})).unwrap();
        assert_eq!(detail(&health), "Status:   ok\nversion:  1.2.0");
    }
}

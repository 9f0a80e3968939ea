//! Fan actuator: status and manual override.

use std::sync::Arc;

use serde_json::Value;
use vayu_core::{ControlStatus, FanControl};

use crate::cli::{FanArgs, FanCommand};
use crate::config::Session;
use crate::error::CliError;
use crate::output;

use super::util;

fn status_detail(status: &ControlStatus) -> String {
    let flag = |v: Option<bool>| match v {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    };
    let mut lines = vec![
        format!("Fan:        {}", if status.fan_on { "ON" } else { "OFF" }),
        format!("Intensity:  {:.0}%", status.fan_intensity),
        format!("Auto mode:  {}", flag(status.auto_mode)),
        format!("Override:   {}", flag(status.manual_override)),
    ];
    for (key, value) in &status.extra {
        lines.push(format!("{:<11} {value}", format!("{key}:")));
    }
    lines.join("\n")
}

pub async fn status(session: &Session) -> Result<(), CliError> {
    let device = util::require_device(session)?;
    let spinner = util::spinner(session, "Fetching control status");
    let envelope = session.client.control_status(device.as_str()).await;
    util::finish(spinner);

    util::present(session, "Control status", &envelope, |status| {
        output::render_single(session.output, status, status_detail, |s| {
            String::from(if s.fan_on { "on" } else { "off" })
        })
    })
}

pub async fn fan(session: &Session, args: FanArgs) -> Result<(), CliError> {
    let control = FanControl::new(Arc::clone(&session.client), session.device());

    let (envelope, done) = match args.command {
        FanCommand::Set { on, intensity, .. } => {
            let envelope = control.set_override(on, intensity).await;
            let done = format!(
                "Fan override applied: {} at {intensity}%",
                if on { "ON" } else { "OFF" }
            );
            (envelope, done)
        }
        FanCommand::Clear => (
            control.clear_override().await,
            "Fan returned to automatic control".to_owned(),
        ),
    };
    tracing::debug!(state = ?control.state(), "fan control settled");

    util::present(session, "Fan override", &envelope, |ack: &Value| {
        output::render_single(
            session.output,
            ack,
            |ack| match ack {
                Value::Null => done.clone(),
                ack => format!("{done}\n{}", output::render_json_pretty(ack)),
            },
            |_| done.clone(),
        )
    })
}

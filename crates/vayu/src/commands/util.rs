//! Shared helpers for command handlers.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;
use vayu_core::resource::NO_DEVICE_MESSAGE;
use vayu_core::{ApiResult, DeviceId, ResourceState, ResourceStream};

use crate::cli::OutputFormat;
use crate::config::Session;
use crate::error::CliError;
use crate::output;

const FALLBACK_NOTICE: &str = "backend unreachable, showing sample data";

/// The session's device, or the same error a resource would report.
pub fn require_device(session: &Session) -> Result<DeviceId, CliError> {
    session.device().ok_or_else(|| CliError::Rejected {
        message: NO_DEVICE_MESSAGE.into(),
    })
}

// ── Progress ────────────────────────────────────────────────────────

/// Spinner on stderr for interactive table output; `None` otherwise.
pub fn spinner(session: &Session, message: &'static str) -> Option<ProgressBar> {
    if session.quiet || session.output != OutputFormat::Table || !io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner());
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

pub fn finish(spinner: Option<ProgressBar>) {
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
}

// ── Envelopes ───────────────────────────────────────────────────────

/// Render a one-shot response.
///
/// JSON formats print the whole envelope. Table and plain print `data`,
/// noting on stderr when it is a fixture. Either way the command fails
/// when there is nothing usable to show.
pub fn present<T: Serialize>(
    session: &Session,
    resource: &str,
    envelope: &ApiResult<T>,
    render: impl FnOnce(&T) -> String,
) -> Result<(), CliError> {
    let failure = failure(session, resource, envelope);

    if let OutputFormat::Json | OutputFormat::JsonCompact = session.output {
        let compact = session.output == OutputFormat::JsonCompact;
        output::print_output(&output::render_json(envelope, compact), session.quiet);
        return failure.map_or(Ok(()), Err);
    }

    if let Some(err) = failure {
        return Err(err);
    }
    if envelope.not_implemented {
        let notice = match &envelope.error {
            Some(error) => format!("{error}, showing sample data"),
            None => FALLBACK_NOTICE.into(),
        };
        output::warn(&notice, session.color);
    }
    if let Some(data) = &envelope.data {
        output::print_output(&render(data), session.quiet);
    }
    Ok(())
}

/// The error for an envelope that carries no usable data.
fn failure<T>(session: &Session, resource: &str, envelope: &ApiResult<T>) -> Option<CliError> {
    if envelope.data.is_some() {
        return None;
    }
    let message = match (&envelope.error, envelope.success) {
        (Some(error), _) => error.as_str(),
        (None, true) => "response contained no data",
        (None, false) => "request failed",
    };
    Some(CliError::from_envelope(
        resource,
        message,
        envelope.not_implemented,
        &session.url(),
    ))
}

// ── Streams ─────────────────────────────────────────────────────────

/// Print every settled state of a resource until Ctrl-C, `count` updates,
/// or the resource goes away.
pub async fn follow<T>(
    session: &Session,
    mut stream: ResourceStream<T>,
    count: Option<usize>,
    render: impl Fn(&T) -> String,
) -> Result<(), CliError>
where
    T: Serialize + Send + Sync + 'static,
{
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed = 0usize;
    let initial = stream.current().clone();
    if !initial.loading {
        emit(session, &initial, &render);
        printed += 1;
    }

    while count.is_none_or(|n| printed < n) {
        let next = tokio::select! {
            biased;
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break;
            }
            next = stream.changed() => next,
        };
        let Some(state) = next else { break };
        if state.loading {
            continue;
        }
        emit(session, &state, &render);
        printed += 1;
    }
    Ok(())
}

fn emit<T: Serialize>(session: &Session, state: &ResourceState<T>, render: &impl Fn(&T) -> String) {
    match session.output {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            let compact = session.output == OutputFormat::JsonCompact;
            output::print_output(&output::render_json(state, compact), session.quiet);
        }
        OutputFormat::Table | OutputFormat::Plain => {
            if let Some(error) = &state.error {
                output::warn(error, session.color);
            } else if state.not_implemented {
                output::warn(FALLBACK_NOTICE, session.color);
            }
            if let Some(data) = &state.data {
                output::print_output(&render(data), session.quiet);
            }
        }
    }
}

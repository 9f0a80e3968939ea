//! Command dispatch: bridges CLI args -> gateway calls / resources -> output.

pub mod analytics;
pub mod config_cmd;
pub mod control;
pub mod dashboard;
pub mod devices;
pub mod health;
pub mod history;
pub mod logs;
pub mod sensor;
pub mod util;

use crate::cli::Command;
use crate::config::Session;
use crate::error::CliError;

/// Dispatch a backend-bound command to its handler.
pub async fn dispatch(cmd: Command, session: &Session) -> Result<(), CliError> {
    match cmd {
        Command::Health => health::handle(session).await,
        Command::Devices => devices::handle(session).await,
        Command::Dashboard => dashboard::handle(session).await,
        Command::Watch(args) => dashboard::watch(session, args).await,
        Command::History(args) => history::handle(session, args).await,
        Command::Sensor(args) => sensor::handle(session, args).await,
        Command::Logs(args) => logs::handle(session, args).await,
        Command::Analytics(args) => analytics::handle(session, args).await,
        Command::Status => control::status(session).await,
        Command::Fan(args) => control::fan(session, args).await,
        // Config and Completions never need a session
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

//! Clap derive structures for the `vayu` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vayu -- air-quality dashboard in the terminal
#[derive(Debug, Parser)]
#[command(
    name = "vayu",
    version,
    about = "Monitor Vayu air-quality sensors from the command line",
    long_about = "Reads live sensor data, predictions and fault reports from a Vayu\n\
        backend, and drives the fan actuator.\n\n\
        Settings come from the config file, then VAYU_* environment\n\
        variables, then the flags below.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub api_url: Option<String>,

    /// Device to query (overrides the configured default)
    #[arg(long, short = 'd', global = true)]
    pub device: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty tables and detail views (default, interactive)
    Table,
    /// Pretty-printed JSON of the full response envelope
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the backend is up
    Health,

    /// List registered devices
    #[command(alias = "dev")]
    Devices,

    /// Show the current dashboard snapshot for a device
    #[command(alias = "dash")]
    Dashboard,

    /// Poll the dashboard continuously and print every update
    Watch(WatchArgs),

    /// Show historical readings for a device
    #[command(alias = "hist")]
    History(HistoryArgs),

    /// Show the latest raw sensor readings and sensor status
    Sensor(SensorArgs),

    /// Show recent blockchain log entries
    Logs(LogsArgs),

    /// Show aggregated analytics for a device
    Analytics(AnalyticsArgs),

    /// Show the fan actuator state
    Status,

    /// Override or release the fan
    Fan(FanArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━ Watch ━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval, e.g. `5s` or `1m 30s` [default: from config]
    #[arg(long, short = 'i')]
    pub interval: Option<humantime::Duration>,

    /// Stop after this many updates instead of running until Ctrl-C
    #[arg(long, short = 'n')]
    pub count: Option<usize>,
}

// ━━━ History ━━━

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Window size in hours
    #[arg(long, short = 'H', default_value_t = 24)]
    pub hours: u32,

    /// Keep polling and print each refreshed window
    #[arg(long, short = 'f')]
    pub follow: bool,

    /// With --follow, stop after this many updates
    #[arg(long, short = 'n', requires = "follow")]
    pub count: Option<usize>,
}

// ━━━ Sensor ━━━

#[derive(Debug, Args)]
pub struct SensorArgs {
    #[command(subcommand)]
    pub command: SensorCommand,
}

#[derive(Debug, Subcommand)]
pub enum SensorCommand {
    /// Sensor hardware status
    Status,

    /// Most recent raw readings
    Readings {
        /// Maximum number of readings
        #[arg(long, short = 'l', default_value_t = vayu_api::DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
}

// ━━━ Logs ━━━

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Maximum number of entries
    #[arg(long, short = 'l', default_value_t = vayu_api::DEFAULT_LOG_LIMIT)]
    pub limit: u32,
}

// ━━━ Analytics ━━━

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    /// Window size in hours
    #[arg(long, short = 'H', default_value_t = vayu_api::DEFAULT_ANALYTICS_HOURS)]
    pub hours: u32,
}

// ━━━ Fan ━━━

#[derive(Debug, Args)]
pub struct FanArgs {
    #[command(subcommand)]
    pub command: FanCommand,
}

#[derive(Debug, Subcommand)]
pub enum FanCommand {
    /// Force the fan on or off, suspending automatic control
    #[command(group(ArgGroup::new("state").required(true).args(["on", "off"])))]
    Set {
        /// Turn the fan on
        #[arg(long)]
        on: bool,

        /// Turn the fan off
        #[arg(long)]
        off: bool,

        /// Fan intensity, 0-100 percent
        #[arg(long, short = 'i', default_value_t = 50)]
        intensity: u8,
    },

    /// Return the fan to automatic control
    Clear,
}

// ━━━ Config ━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ━━━ Completions ━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

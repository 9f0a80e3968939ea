//! CLI configuration: thin wrapper around `vayu_config`.
//!
//! Layers `GlobalOpts` flag overrides (--api-url, --device, --timeout) on
//! top of the file + environment config and opens a session against the
//! resulting backend.

use std::sync::Arc;

use clap::ValueEnum;
use vayu_core::{DeviceId, SyncConfig, VayuClient};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub use vayu_config::{Config, config_path, load_config, save_config};

// ── Flag overrides ──────────────────────────────────────────────────

/// Apply flag overrides. Flags beat environment, which beats the file.
pub fn apply_overrides(mut cfg: Config, global: &GlobalOpts) -> Result<Config, CliError> {
    if let Some(url) = &global.api_url {
        cfg.api_base_url.clone_from(url);
    }
    if let Some(device) = &global.device {
        let device = DeviceId::parse(device).ok_or_else(|| CliError::Validation {
            field: "device".into(),
            reason: "must not be blank".into(),
        })?;
        cfg.default_device_id = device.into();
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    Ok(cfg)
}

/// `--output`, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// `--color`, else `defaults.color`, else auto.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global.color.unwrap_or_else(|| {
        ColorMode::from_str(&cfg.defaults.color, true).unwrap_or(ColorMode::Auto)
    })
}

/// Load the config and apply flag overrides.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    apply_overrides(load_config()?, global)
}

// ── Session ─────────────────────────────────────────────────────────

/// Everything a backend-bound command needs.
pub struct Session {
    pub client: Arc<VayuClient>,
    pub sync: SyncConfig,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = resolve(global)?;
        let sync = cfg.to_sync_config()?;
        let client = Arc::new(sync.client()?);
        tracing::debug!(url = %sync.api_base_url, "session opened");

        Ok(Self {
            client,
            output: output_format(global, &cfg),
            color: output::should_color(color_mode(global, &cfg)),
            quiet: global.quiet,
            sync,
        })
    }

    /// Device every per-device command targets.
    pub fn device(&self) -> Option<DeviceId> {
        self.sync.default_device.clone()
    }

    /// Backend URL, for diagnostics.
    pub fn url(&self) -> String {
        self.sync.api_base_url.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["vayu"];
        argv.extend_from_slice(args);
        argv.push("health");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_config() {
        let cfg = apply_overrides(
            Config::default(),
            &global(&["--api-url", "http://sensor.lan:9000", "-d", "ESP32_007", "--timeout", "3"]),
        )
        .unwrap();

        assert_eq!(cfg.api_base_url, "http://sensor.lan:9000");
        assert_eq!(cfg.default_device_id, "ESP32_007");
        assert_eq!(cfg.timeout, 3);
    }

    #[test]
    fn blank_device_flag_is_rejected() {
        let err = apply_overrides(Config::default(), &global(&["--device", "  "])).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn output_falls_back_to_config_then_table() {
        let mut cfg = Config::default();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);

        cfg.defaults.output = "json".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Json);
        assert_eq!(
            output_format(&global(&["-o", "plain"]), &cfg),
            OutputFormat::Plain
        );

        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
    }

    #[test]
    fn color_mode_from_config() {
        let mut cfg = Config::default();
        cfg.defaults.color = "never".into();
        assert_eq!(color_mode(&global(&[]), &cfg), ColorMode::Never);
        assert_eq!(
            color_mode(&global(&["--color", "always"]), &cfg),
            ColorMode::Always
        );
    }
}

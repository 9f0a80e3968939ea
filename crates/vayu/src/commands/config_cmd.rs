//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("<unrenderable config: {e}>"))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            // Validate before printing so a bad value is reported, not shown.
            cfg.to_sync_config()?;
            let format = config::output_format(global, &cfg);
            let out = output::render_single(format, &cfg, format_config, |c| {
                c.api_base_url.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let existing = config::config_path();
            if existing.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: existing.display().to_string(),
                });
            }
            let path = config::save_config(&Config::default())?;
            output::print_output(
                &format!("Wrote default configuration to {}", path.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}

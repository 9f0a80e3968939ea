//! Shared configuration for Vayu tools.
//!
//! Layers built-in defaults, an optional TOML file in the platform config
//! directory, and `VAYU_*` environment variables, then translates the
//! result into `vayu_core::SyncConfig`. The CLI applies its own flag
//! overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use vayu_core::config::{
    DEFAULT_API_BASE_URL, DEFAULT_DEVICE_ID, DEFAULT_HISTORY_POLL_INTERVAL, DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT,
};
use vayu_core::{DeviceId, SyncConfig};

/// Prefix for environment overrides, e.g. `VAYU_API_BASE_URL`.
pub const ENV_PREFIX: &str = "VAYU_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
///
/// Intervals are milliseconds, `timeout` is seconds. Interval values that
/// are missing, zero, or not a number fall back to their defaults rather
/// than failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Dashboard polling interval (ms).
    #[serde(
        default = "default_polling_interval",
        deserialize_with = "polling_interval"
    )]
    pub polling_interval: u64,

    /// Device selected when none is given.
    #[serde(default = "default_device_id")]
    pub default_device_id: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Historical data polling interval (ms), used in continuous mode.
    #[serde(
        default = "default_history_poll_interval",
        deserialize_with = "history_poll_interval"
    )]
    pub history_poll_interval: u64,

    /// Presentation defaults for the CLI.
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            polling_interval: default_polling_interval(),
            default_device_id: default_device_id(),
            timeout: default_timeout(),
            history_poll_interval: default_history_poll_interval(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.into()
}
fn default_device_id() -> String {
    DEFAULT_DEVICE_ID.into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
fn default_polling_interval() -> u64 {
    millis(DEFAULT_POLL_INTERVAL)
}
fn default_history_poll_interval() -> u64 {
    millis(DEFAULT_HISTORY_POLL_INTERVAL)
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ── Lenient interval parsing ────────────────────────────────────────

/// Interval as it may arrive from a file or the environment.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInterval {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawInterval {
    /// Leading-integer parse: `"2500ms"` reads as 2500. Zero and negative
    /// values count as unset.
    fn millis(self) -> Option<u64> {
        let ms = match self {
            Self::Int(n) => u64::try_from(n).ok(),
            Self::Float(f) => format!("{}", f.trunc()).parse::<u64>().ok(),
            Self::Text(s) => {
                let digits: String = s.trim().chars().take_while(char::is_ascii_digit).collect();
                digits.parse().ok()
            }
        };
        ms.filter(|&ms| ms > 0)
    }
}

fn polling_interval<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = RawInterval::deserialize(deserializer)?;
    Ok(raw.millis().unwrap_or_else(default_polling_interval))
}

fn history_poll_interval<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = RawInterval::deserialize(deserializer)?;
    Ok(raw.millis().unwrap_or_else(default_history_poll_interval))
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and convert into the runtime configuration.
    ///
    /// A blank URL or device id means "use the default".
    pub fn to_sync_config(&self) -> Result<SyncConfig, ConfigError> {
        let raw_url = match self.api_base_url.trim() {
            "" => DEFAULT_API_BASE_URL,
            url => url,
        };
        let api_base_url = Url::parse(raw_url)
            .map_err(|e| ConfigError::invalid("api_base_url", format!("'{raw_url}': {e}")))?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "api_base_url",
                format!("expected an http or https URL, got '{raw_url}'"),
            ));
        }

        if self.timeout == 0 {
            return Err(ConfigError::invalid("timeout", "must be at least 1 second"));
        }

        let default_device =
            DeviceId::parse(&self.default_device_id).or_else(|| DeviceId::parse(DEFAULT_DEVICE_ID));

        Ok(SyncConfig {
            api_base_url,
            poll_interval: Duration::from_millis(self.polling_interval),
            history_poll_interval: Duration::from_millis(self.history_poll_interval),
            default_device,
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("tech", "vayu", "vayu").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vayu");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the default file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is fine.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    fn load(path: &str) -> Result<Config, figment::Error> {
        load_config_from(Path::new(path)).map_err(|e| e.to_string().into())
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let cfg = load("missing.toml")?;
            assert_eq!(cfg, Config::default());

            let sync = cfg.to_sync_config().unwrap();
            assert_eq!(
                sync,
                SyncConfig::new(Url::parse(DEFAULT_API_BASE_URL).unwrap())
            );
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "vayu.toml",
                r#"
                    api_base_url = "http://file.local:9000"
                    polling_interval = 2000
                    default_device_id = "ESP32_FILE"

                    [defaults]
                    output = "json"
                "#,
            )?;
            jail.set_env("VAYU_API_BASE_URL", "http://env.local:8000");
            jail.set_env("VAYU_TIMEOUT", "3");
            jail.set_env("VAYU_DEFAULTS__COLOR", "never");

            let cfg = load("vayu.toml")?;
            assert_eq!(cfg.api_base_url, "http://env.local:8000");
            assert_eq!(cfg.polling_interval, 2000);
            assert_eq!(cfg.default_device_id, "ESP32_FILE");
            assert_eq!(cfg.timeout, 3);
            assert_eq!(cfg.defaults.output, "json");
            assert_eq!(cfg.defaults.color, "never");

            let sync = cfg.to_sync_config().unwrap();
            assert_eq!(sync.api_base_url.host_str(), Some("env.local"));
            assert_eq!(sync.poll_interval, Duration::from_secs(2));
            assert_eq!(sync.timeout, Duration::from_secs(3));
            Ok(())
        });
    }

    #[test]
    fn unparsable_interval_falls_back_to_default() {
        Jail::expect_with(|jail| {
            jail.set_env("VAYU_POLLING_INTERVAL", "soon");
            assert_eq!(load("missing.toml")?.polling_interval, 5000);

            jail.set_env("VAYU_POLLING_INTERVAL", "0");
            assert_eq!(load("missing.toml")?.polling_interval, 5000);

            jail.set_env("VAYU_POLLING_INTERVAL", "2500ms");
            assert_eq!(load("missing.toml")?.polling_interval, 2500);

            jail.set_env("VAYU_HISTORY_POLL_INTERVAL", "-1");
            assert_eq!(load("missing.toml")?.history_poll_interval, 30_000);
            Ok(())
        });
    }

    #[test]
    fn blank_values_mean_default() {
        let cfg = Config {
            api_base_url: "  ".into(),
            default_device_id: String::new(),
            ..Config::default()
        };
        let sync = cfg.to_sync_config().unwrap();
        assert_eq!(sync.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(
            sync.default_device.as_ref().map(DeviceId::as_str),
            Some("ESP32_001")
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_url = Config {
            api_base_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            bad_url.to_sync_config(),
            Err(ConfigError::Validation { field, .. }) if field == "api_base_url"
        ));

        let wrong_scheme = Config {
            api_base_url: "ftp://localhost".into(),
            ..Config::default()
        };
        assert!(wrong_scheme.to_sync_config().is_err());

        let no_timeout = Config {
            timeout: 0,
            ..Config::default()
        };
        assert!(matches!(
            no_timeout.to_sync_config(),
            Err(ConfigError::Validation { field, .. }) if field == "timeout"
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nested").join("config.toml");
            let cfg = Config {
                api_base_url: "https://vayu.example:8443".into(),
                history_poll_interval: 60_000,
                ..Config::default()
            };
            save_config_to(&cfg, &path).map_err(|e| e.to_string())?;

            let loaded = load_config_from(&path).map_err(|e| e.to_string())?;
            assert_eq!(loaded, cfg);
            Ok(())
        });
    }
}

//! `hold-on` configuration: TOML file, then env overrides, then CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use proto::{ConfigError, Theme};
use serde::Deserialize;
use tracing::{debug, warn};

/// Default wait for a reviewer before the session times out (30 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30 * 60;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

/// `[feedback]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackConfig {
    /// Page theme.
    #[serde(default)]
    pub theme: Theme,
    /// Seconds to wait for a submission before resolving as timed out.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Launch the system browser for each session; otherwise only log the URL.
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_open_browser() -> bool {
    true
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            open_browser: true,
        }
    }
}

impl FeedbackConfig {
    /// Session timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Loads configuration from the explicit path or `~/.hold-on/config.toml`,
    /// then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path
            .map(Path::to_path_buf)
            .or_else(|| default_config_path().filter(|p| p.exists()));
        debug!(path = ?config_path, "Config file resolved");

        let mut config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                toml::from_str::<Config>(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
            }
            None => Config::default(),
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(theme) = std::env::var("HOLDON_THEME") {
            self.feedback.theme = Theme::parse_or_auto(Some(&theme));
        }
        if let Ok(secs) = std::env::var("HOLDON_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.feedback.timeout_secs = secs,
                _ => warn!(value = %secs, "Ignoring HOLDON_TIMEOUT_SECS: not a positive integer"),
            }
        }
        if let Ok(open) = std::env::var("HOLDON_OPEN_BROWSER") {
            self.feedback.open_browser = !matches!(
                open.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.feedback.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feedback.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// `~/.hold-on`, the home of the config file and debug logs.
pub fn state_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".hold-on")
}

fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok()?;
    Some(state_dir().join("config.toml"))
}

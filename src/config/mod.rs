// ABOUTME: Configuration types and parsing for cutover.yml.
// ABOUTME: Holds the steady-state polling settings shared by every protocol run.

mod init;

pub use init::init_config;

use crate::error::{Error, Result};
use crate::task::DEFAULT_POLL_INTERVAL;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "cutover.yml";
pub const CONFIG_FILENAME_ALT: &str = "cutover.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".cutover/config.yml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub steady_state: SteadyStateConfig,
}

/// How steady-state waits poll, and how long they wait when a task gives no timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SteadyStateConfig {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub default_timeout: Duration,
}

impl Default for SteadyStateConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            default_timeout: default_timeout(),
        }
    }
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_timeout() -> Duration {
    Duration::from_secs(600)
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Like [`Config::discover`], but falls back to defaults when no file exists.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.steady_state.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "steady_state.poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn template() -> Self {
        Self::default()
    }
}

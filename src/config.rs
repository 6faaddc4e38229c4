use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{errors::ConfigError, poller::Schedule};

pub const DEFAULT_INTERVAL_MINUTES: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelbolConfig {
    #[serde(default)]
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default)]
    pub interval_minutes: Option<u64>,
    #[serde(default)]
    pub align_to_wall_clock: Option<bool>,
    #[serde(default)]
    pub fire_immediately: Option<bool>,
}

impl FuelbolConfig {
    /// `~/.fuelbol/config.toml`, then `./fuelbol.toml`. Later files win, missing files
    /// are skipped.
    pub fn load_hierarchy() -> Result<Self, ConfigError> {
        let mut paths = Vec::new();
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".fuelbol").join("config.toml"));
        }
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("fuelbol.toml"));
        }
        Self::load_from(&paths)
    }

    pub fn load_from(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut config = FuelbolConfig::default();
        for path in paths {
            if !path.exists() {
                debug!(event = "config.file_skipped", path = %path.display());
                continue;
            }
            let file_config = Self::load_config_file(path)?;
            config = Self::merge_configs(config, file_config);
        }
        Ok(config)
    }

    pub fn load_config_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(event = "config.file_loaded", path = %path.display());
        Ok(config)
    }

    pub fn merge_configs(base: Self, override_config: Self) -> Self {
        FuelbolConfig {
            poll: PollConfig {
                interval_minutes: override_config
                    .poll
                    .interval_minutes
                    .or(base.poll.interval_minutes),
                align_to_wall_clock: override_config
                    .poll
                    .align_to_wall_clock
                    .or(base.poll.align_to_wall_clock),
                fire_immediately: override_config
                    .poll
                    .fire_immediately
                    .or(base.poll.fire_immediately),
            },
        }
    }

    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        let minutes = self
            .poll
            .interval_minutes
            .unwrap_or(DEFAULT_INTERVAL_MINUTES);
        if minutes == 0 {
            return Err(ConfigError::InvalidInterval { minutes });
        }

        Ok(Schedule {
            interval: Duration::from_secs(minutes * 60),
            align_to_wall_clock: self.poll.align_to_wall_clock.unwrap_or(true),
            fire_immediately: self.poll.fire_immediately.unwrap_or(true),
        })
    }
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::controller::DEFAULT_VOLUME;
use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub stations: StationsConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Initial volume, 0–100.
    #[serde(default = "default_volume")]
    pub default_volume: i32,
    /// Start the first station as soon as the window opens.
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
}

/// Where the station list is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    /// JSON, TOML or M3U station file, picked by extension.
    /// Defaults to `<config_dir>/radio_stations.json`.
    #[serde(default = "default_stations_file")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MpvConfig {
    /// Explicit mpv binary; otherwise searched beside the exe, then on PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            autoplay: default_autoplay(),
        }
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            file: default_stations_file(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_volume() -> i32 {
    DEFAULT_VOLUME
}

fn default_autoplay() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_stations_file() -> PathBuf {
    platform::config_dir().join("radio_stations.json")
}

impl Config {
    /// Load `config_path`, writing defaults out on first run.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

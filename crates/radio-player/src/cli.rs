use std::path::PathBuf;

use clap::Parser;
use radio_core::config::Config;

/// Terminal internet-radio player.
#[derive(Parser, Debug)]
#[command(name = "radio-player")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Station list (JSON, TOML or M3U). Overrides the config file.
    #[arg(short, long, value_name = "FILE")]
    pub stations: Option<PathBuf>,

    /// Initial volume, 0–100. Overrides the config file.
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(0..=100))]
    pub volume: Option<i32>,

    /// Do not start the first station on launch.
    #[arg(long)]
    pub no_autoplay: bool,

    /// Print the station list and exit.
    #[arg(short, long)]
    pub list: bool,
}

impl Args {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::config_path)
    }

    /// Fold command-line overrides into the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(stations) = &self.stations {
            config.stations.file = stations.clone();
        }
        if let Some(volume) = self.volume {
            config.player.default_volume = volume;
        }
        if self.no_autoplay {
            config.player.autoplay = false;
        }
    }
}

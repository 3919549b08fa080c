mod action;
mod app;
mod cli;
mod logging;
mod mpv;
mod theme;
mod ui;

use std::io;
use std::path::Path;

use clap::Parser;
use radio_core::config::Config;
use radio_core::{PlaybackController, RegistryError, StationRegistry};
use tracing::{info, warn};

use crate::mpv::MpvBackend;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    // Config problems are not fatal: fall back to defaults and say so once
    // logging is up.
    let config_path = args.config_path();
    let (mut config, config_error) = match Config::load_from(&config_path) {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    args.apply(&mut config);

    if args.list {
        return list_stations(&config);
    }

    let (log_path, status_rx) = logging::init(&config.logging.filter)?;
    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("radio-player log: {}", log_path.display());
    info!("radio-player starting…");
    info!("config: {:?}", config_path);
    if let Some(e) = config_error {
        warn!("config {:?} unreadable, using defaults: {}", config_path, e);
    }

    let mut registry = StationRegistry::default();
    registry.load(&config.stations.file);

    let volume = config.player.default_volume;
    let mut controller = PlaybackController::create(registry, volume, || {
        MpvBackend::create_instance(&config.mpv, volume)
    });

    if config.player.autoplay && !controller.registry().is_empty() {
        controller.play_current();
    }

    app::App::new(controller, status_rx).run()
}

/// A missing station file lists as empty, same as at startup.
fn registry_for_listing(path: &Path) -> Result<StationRegistry, RegistryError> {
    match StationRegistry::from_path(path) {
        Err(RegistryError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            Ok(StationRegistry::default())
        }
        other => other,
    }
}

fn list_stations(config: &Config) -> anyhow::Result<()> {
    let registry = registry_for_listing(&config.stations.file)?;
    if registry.is_empty() {
        println!("No stations loaded.");
        return Ok(());
    }
    for (i, station) in registry.iter().enumerate() {
        println!("{:>3}  {}  {}", i + 1, station.name, station.uri);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_for_listing(&dir.path().join("radio_stations.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_listing_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radio_stations.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            registry_for_listing(&path),
            Err(RegistryError::Json(_))
        ));
    }
}

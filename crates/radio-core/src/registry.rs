//! Station registry — the ordered, read-only station list loaded at startup.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::station::{parse_stations, SourceFormat, Station};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("cannot read station file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON station file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed TOML station file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("station #{index} has an empty `{field}`")]
    InvalidStation { index: usize, field: &'static str },
}

/// Ordered station list. Order is file order; nothing is added, removed or
/// reordered after `load`.
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: Vec<Station>,
}

impl StationRegistry {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// Parse a station file, surfacing the typed error.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stations = parse_stations(&content, SourceFormat::from_path(path))?;
        Ok(Self { stations })
    }

    /// Load stations from `path`. Returns whether at least one station was
    /// loaded. Failures are logged and leave the registry empty.
    pub fn load(&mut self, path: &Path) -> bool {
        match Self::from_path(path) {
            Ok(loaded) => {
                self.stations = loaded.stations;
                if self.stations.is_empty() {
                    warn!("registry: {:?} contains no stations", path);
                } else {
                    info!(
                        "registry: loaded {} station(s) from {:?}",
                        self.stations.len(),
                        path
                    );
                }
            }
            Err(RegistryError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                error!(
                    "registry: {:?} not found, create it with your station list",
                    path
                );
                self.stations.clear();
            }
            Err(e) => {
                error!("registry: {}", e);
                self.stations.clear();
            }
        }
        !self.stations.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn count(&self) -> usize {
        self.stations.len()
    }

    pub fn station_at(&self, index: usize) -> Option<&Station> {
        self.stations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json_file() {
        let file = write_temp(
            ".json",
            r#"{"stations": [{"name": "A", "uri": "u1"}, {"name": "B", "uri": "u2"}]}"#,
        );
        let mut registry = StationRegistry::default();
        assert!(registry.load(file.path()));
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.station_at(1), Some(&Station::new("B", "u2")));
        assert_eq!(registry.station_at(2), None);
    }

    #[test]
    fn test_missing_file_is_empty_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = StationRegistry::default();
        assert!(!registry.load(&dir.path().join("radio_stations.json")));
        assert_eq!(registry.count(), 0);
        assert!(registry.is_empty());
        assert_eq!(registry.station_at(0), None);
    }

    #[test]
    fn test_zero_stations_returns_false() {
        let file = write_temp(".json", r#"{"stations": []}"#);
        let mut registry = StationRegistry::default();
        assert!(!registry.load(file.path()));
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_malformed_file_clears_previous_contents() {
        let file = write_temp(".json", "{ not json");
        let mut registry = StationRegistry::new(vec![Station::new("Old", "u")]);
        assert!(!registry.load(file.path()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_path_reports_io_error() {
        let err = StationRegistry::from_path(Path::new("/no/such/stations.json")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }
}

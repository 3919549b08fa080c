use serde::{Deserialize, Serialize};

use crate::registry::RegistryError;

/// A named audio-stream endpoint.
///
/// The URI is not checked here; a bad address only shows up when the
/// backend tries to open it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub uri: String,
}

impl Station {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }

    fn validate(self, index: usize) -> Result<Self, RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::InvalidStation {
                index,
                field: "name",
            });
        }
        if self.uri.trim().is_empty() {
            return Err(RegistryError::InvalidStation { index, field: "uri" });
        }
        Ok(self)
    }
}

/// On-disk formats a station list can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Toml,
    M3u,
}

impl SourceFormat {
    /// Pick a format from the file extension. Anything unrecognised is JSON.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => Self::Toml,
            Some("m3u") | Some("m3u8") => Self::M3u,
            _ => Self::Json,
        }
    }
}

pub fn parse_stations(content: &str, format: SourceFormat) -> Result<Vec<Station>, RegistryError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let stations = match format {
        SourceFormat::Json => parse_json(content)?,
        SourceFormat::Toml => parse_toml(content)?,
        SourceFormat::M3u => parse_m3u(content),
    };
    stations
        .into_iter()
        .enumerate()
        .map(|(i, s)| s.validate(i))
        .collect()
}

// ── JSON ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct JsonStationFile {
    #[serde(default)]
    stations: Vec<Station>,
}

fn parse_json(content: &str) -> Result<Vec<Station>, RegistryError> {
    let file: JsonStationFile = serde_json::from_str(content)?;
    Ok(file.stations)
}

// ── TOML ──────────────────────────────────────────────────────────────────────

/// Matches the `[[station]]` table layout.
#[derive(Debug, Deserialize)]
struct TomlStationFile {
    #[serde(default)]
    station: Vec<TomlStation>,
}

#[derive(Debug, Deserialize)]
struct TomlStation {
    name: String,
    #[serde(alias = "url")]
    uri: String,
}

fn parse_toml(content: &str) -> Result<Vec<Station>, RegistryError> {
    let file: TomlStationFile = toml::from_str(content)?;
    Ok(file
        .station
        .into_iter()
        .map(|s| Station::new(s.name, s.uri))
        .collect())
}

// ── M3U ───────────────────────────────────────────────────────────────────────

fn parse_m3u(content: &str) -> Vec<Station> {
    let mut stations = Vec::new();
    let mut pending_name: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("#EXTINF:") {
            if let Some(comma_idx) = rest.find(',') {
                pending_name = Some(rest[comma_idx + 1..].trim().to_string());
            }
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        let uri = line.to_string();
        let name = pending_name.take().unwrap_or_else(|| uri.clone());
        stations.push(Station { name, uri });
    }

    stations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_keeps_file_order() {
        let json = r#"{"stations": [
            {"name": "Jazz", "uri": "http://jazz.example/stream"},
            {"name": "Talk", "uri": "http://talk.example/stream"}
        ]}"#;
        let stations = parse_stations(json, SourceFormat::Json).unwrap();
        assert_eq!(
            stations,
            vec![
                Station::new("Jazz", "http://jazz.example/stream"),
                Station::new("Talk", "http://talk.example/stream"),
            ]
        );
    }

    #[test]
    fn test_json_without_stations_key_is_empty() {
        let stations = parse_stations(r#"{"other": 1}"#, SourceFormat::Json).unwrap();
        assert!(stations.is_empty());
    }

    #[test]
    fn test_json_missing_uri_is_parse_error() {
        let err = parse_stations(r#"{"stations": [{"name": "A"}]}"#, SourceFormat::Json)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Json(_)));
    }

    #[test]
    fn test_json_wrong_type_is_parse_error() {
        let err = parse_stations(r#"{"stations": [{"name": 5, "uri": "u"}]}"#, SourceFormat::Json)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Json(_)));
    }

    #[test]
    fn test_blank_field_is_invalid_station() {
        let json = r#"{"stations": [
            {"name": "A", "uri": "u1"},
            {"name": "B", "uri": "   "}
        ]}"#;
        let err = parse_stations(json, SourceFormat::Json).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidStation { index: 1, field: "uri" }
        ));
    }

    #[test]
    fn test_toml_accepts_url_alias() {
        let toml = r#"
[[station]]
name = "Jazz"
url = "http://jazz.example/stream"

[[station]]
name = "Talk"
uri = "http://talk.example/stream"
"#;
        let stations = parse_stations(toml, SourceFormat::Toml).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].uri, "http://jazz.example/stream");
        assert_eq!(stations[1].name, "Talk");
    }

    #[test]
    fn test_m3u_names_and_bare_urls() {
        let m3u = "#EXTM3U\n#EXTINF:-1,Jazz FM\nhttp://jazz.example/stream\n\nhttp://bare.example/\n";
        let stations = parse_stations(m3u, SourceFormat::M3u).unwrap();
        assert_eq!(stations[0], Station::new("Jazz FM", "http://jazz.example/stream"));
        assert_eq!(stations[1].name, "http://bare.example/");
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let m3u = "\u{feff}#EXTM3U\n#EXTINF:-1,Jazz\nhttp://j/\n";
        let stations = parse_stations(m3u, SourceFormat::M3u).unwrap();
        assert_eq!(stations, vec![Station::new("Jazz", "http://j/")]);

        let json = "\u{feff}{\"stations\": [{\"name\": \"Jazz\", \"uri\": \"http://j/\"}]}";
        assert_eq!(parse_stations(json, SourceFormat::Json).unwrap().len(), 1);
    }

    #[test]
    fn test_format_from_extension() {
        use std::path::Path;
        assert_eq!(SourceFormat::from_path(Path::new("a.TOML")), SourceFormat::Toml);
        assert_eq!(SourceFormat::from_path(Path::new("a.m3u8")), SourceFormat::M3u);
        assert_eq!(SourceFormat::from_path(Path::new("a.json")), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("stations")), SourceFormat::Json);
    }
}

//! Loading of sprite definition files
//!
//! A definition file is a single mapping of id -> definition, written as
//! JSON (`.json`) or TOML (`.toml`). Entries are trusted as-is; invalid
//! definitions are filtered at lookup time, not here.

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;

use super::definition::TasDefinition;

/// Definitions keyed by id, as stored in one data file
pub type DefinitionMap = HashMap<String, TasDefinition>;

/// Errors that can occur while loading definition files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    TomlError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Parse error in {path:?}: {source}")]
    JsonError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Unsupported definition file {path:?} (expected .json or .toml)")]
    UnsupportedFormat { path: PathBuf },
    #[error("No handler provided asset {name:?}")]
    AssetNotProvided { name: String },
}

/// Load a definition file, picking the format from its extension
pub fn load_file(path: &Path) -> Result<DefinitionMap, ConfigError> {
    let format = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
        Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
        _ => {
            return Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };

    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;

    match format {
        Format::Json => serde_json::from_str(&contents).map_err(|e| ConfigError::JsonError {
            path: path.to_path_buf(),
            source: e,
        }),
        Format::Toml => toml::from_str(&contents).map_err(|e| ConfigError::TomlError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

enum Format {
    Json,
    Toml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_definition_toml() {
        let toml = r#"
[sparkle]
Texture = "LooseSprites/Cursors"
SourceRect = { X = 0, Y = 0, Width = 16, Height = 16 }
Interval = 100.0
Frames = 4
SpawnInterval = 250.0
EndActions = ["PlaySound crystal"]

[sparkle.RandMin]
Scale = -0.5

[sparkle.RandMax]
Scale = 0.5
SpawnInterval = 100.0
"#;

        let map: DefinitionMap = toml::from_str(toml).unwrap();
        let def = &map["sparkle"];
        assert_eq!(def.frames, 4);
        assert_eq!(def.source_rect.width, 16);
        assert_eq!(def.spawn_interval, 250.0);
        assert!(def.has_rand());
        assert_eq!(def.rand_max.unwrap().spawn_interval, 100.0);
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "dust": {{ "Frames": 2, "Interval": 50, "Condition": "WEATHER Here Sun" }} }}"#
        )
        .unwrap();

        let map = load_file(file.path()).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["dust"].condition_expression(), Some("WEATHER Here Sun"));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            load_file(file.path()),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_malformed_json_reports_path() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::JsonError { .. }));
        assert!(err.to_string().contains("Parse error"));
    }
}

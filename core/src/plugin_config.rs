//! Plugin configuration
//!
//! Read with confy from the `tas-ext` application config.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const APP_NAME: &str = "tas-ext";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Unique id of the owning mod; the definition asset is `"{mod_id}/TAS"`
    pub mod_id: String,
    /// Definition file, relative to `content_root`
    pub data_file: PathBuf,
    pub content_root: PathBuf,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            mod_id: "TASExtensions".to_string(),
            data_file: PathBuf::from("assets/tas.json"),
            content_root: PathBuf::from("."),
        }
    }
}

impl PluginConfig {
    /// Load the saved config, falling back to defaults
    pub fn load() -> Self {
        confy::load(APP_NAME, None).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load plugin config, using defaults");
            Self::default()
        })
    }

    /// Asset name the definitions are published under
    pub fn asset_name(&self) -> String {
        format!("{}/TAS", self.mod_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_name_from_mod_id() {
        let config = PluginConfig {
            mod_id: "Example.Sparkles".to_string(),
            ..Default::default()
        };
        assert_eq!(config.asset_name(), "Example.Sparkles/TAS");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PluginConfig = toml::from_str(r#"mod_id = "Example.Sparkles""#).unwrap();
        assert_eq!(config.data_file, PathBuf::from("assets/tas.json"));
        assert_eq!(config.content_root, PathBuf::from("."));
    }
}

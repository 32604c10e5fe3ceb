//! Configuration file parsing (JSON format).

use std::path::Path;

use crate::common::error::ConfigError;
use crate::config::types::{Config, RawConfig};
use crate::config::validate::resolve_config;

/// Example configuration printed when the config file is missing.
pub const EXAMPLE_CONFIG: &str = r#"{
  "mappings": [
    {
      "discordId": "123456789012345678",
      "fluxerId": "987654321098765432",
      "direction": "both",
      "label": "my-channel",
      "allowCrossposts": true,
      "formatting": {
        "includeUsername": true,
        "includeAvatar": true,
        "timestampFormat": "none"
      }
    }
  ],
  "defaultFormatting": {
    "includeUsername": false,
    "includeAvatar": false,
    "timestampFormat": "none"
  }
}"#;

/// Load and validate configuration from a JSON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    load_config_str(&content)
}

/// Load and validate configuration from a JSON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig =
        serde_json::from_str(content).map_err(|e| ConfigError::Parse { source: e })?;
    resolve_config(raw)
}

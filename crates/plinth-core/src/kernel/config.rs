use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kernel::constants::{DEFAULT_PLUGINS_DIR, MANIFEST_FILE_STEM};
use crate::kernel::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Every format compiled into this build, JSON first.
    pub fn enabled() -> Vec<ConfigFormat> {
        vec![
            ConfigFormat::Json,
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml,
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml,
        ]
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Deserialize `contents` in this format.
    pub fn parse<T: DeserializeOwned>(&self, contents: &str) -> std::result::Result<T, String> {
        match self {
            ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        }
    }
}

/// Settings the host uses to assemble the plugin set before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Directories searched for plugin manifests.
    pub plugin_dirs: Vec<PathBuf>,
    /// File names recognised as manifests inside those directories.
    pub manifest_names: Vec<String>,
    /// Plugins removed from the registry after loading, before resolution.
    pub disabled: Vec<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            plugin_dirs: vec![PathBuf::from(DEFAULT_PLUGINS_DIR)],
            manifest_names: ConfigFormat::enabled()
                .iter()
                .map(|format| format!("{}.{}", MANIFEST_FILE_STEM, format.extension()))
                .collect(),
            disabled: Vec::new(),
        }
    }
}

impl BootstrapConfig {
    /// Parse a config from a string in the given format.
    pub fn from_str(contents: &str, format: ConfigFormat) -> std::result::Result<Self, String> {
        format.parse(contents)
    }

    /// Load a config file, choosing the format from its extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| Error::Config {
            path: path.to_path_buf(),
            message: "unknown or unsupported config format".to_string(),
        })?;
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(e, "read config", path.to_path_buf()))?;
        let config = Self::from_str(&contents, format).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })?;
        log::debug!("Loaded bootstrap config from {}", path.display());
        Ok(config)
    }

    /// Whether a plugin has been switched off by this config.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|disabled| disabled == name)
    }
}

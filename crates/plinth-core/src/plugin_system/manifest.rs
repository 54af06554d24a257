use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::kernel::config::ConfigFormat;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::plugin::PluginMetadata;
use crate::plugin_system::registry::Registry;

// --- Intermediate struct for deserialization ---

#[derive(Deserialize, Debug)]
struct RawPluginManifest {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// A declarative plugin read from a manifest file.
///
/// ```json
/// { "name": "cache", "version": "1.2.0", "dependencies": { "storage": "^1.0" }, "enabled": true }
/// ```
///
/// Keys besides `name`, `version` and `dependencies` become metadata fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginManifest {
    pub name: String,
    pub metadata: PluginMetadata,
    /// File the manifest was read from, if any
    pub path: Option<PathBuf>,
}

impl PluginManifest {
    /// Parse manifest text in the given format.
    pub fn parse(contents: &str, format: ConfigFormat) -> std::result::Result<Self, String> {
        let raw: RawPluginManifest = format.parse(contents)?;
        Ok(Self {
            name: raw.name,
            metadata: PluginMetadata {
                version: raw.version,
                dependencies: raw.dependencies,
                fields: raw.fields,
            },
            path: None,
        })
    }

    /// Read and parse a manifest file, choosing the format from its extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| Error::Manifest {
            path: path.to_path_buf(),
            message: "unknown or unsupported manifest format".to_string(),
        })?;
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io(e, "read manifest", path.to_path_buf()))?;
        let mut manifest = Self::parse(&contents, format).map_err(|message| Error::Manifest {
            path: path.to_path_buf(),
            message,
        })?;
        manifest.path = Some(path.to_path_buf());
        Ok(manifest)
    }

    /// Register the described plugin. Declarative plugins carry no initializer.
    pub fn register(self, registry: &mut Registry) -> Result<()> {
        registry.plugin(self.name, self.metadata)?;
        Ok(())
    }
}

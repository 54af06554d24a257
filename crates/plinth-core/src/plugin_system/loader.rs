//! Plugin discovery.
//!
//! The registry never loads code itself. A [`PluginSource`] produces
//! [`Registration`] functions, and [`load_all`] applies them to a registry
//! before the pipeline runs. Two sources ship with the crate: [`StaticSource`]
//! for plugins compiled into the host, and [`ManifestSource`] for declarative
//! plugins described by manifest files on disk.
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::kernel::config::BootstrapConfig;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::registry::Registry;

/// Registers one or more plugins with a registry.
pub type Registration = Box<dyn FnOnce(&mut Registry) -> Result<()> + Send>;

/// A function a compiled-in plugin exposes to register itself.
pub type RegisterFn = fn(&mut Registry) -> Result<()>;

/// Something that can produce plugin registrations.
#[async_trait]
pub trait PluginSource: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str;

    /// Discover plugins and return one registration per plugin.
    async fn registrations(&self) -> Result<Vec<Registration>>;
}

/// Plugins compiled into the host.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    entries: Vec<RegisterFn>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, register: RegisterFn) -> Self {
        self.entries.push(register);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PluginSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn registrations(&self) -> Result<Vec<Registration>> {
        Ok(self
            .entries
            .iter()
            .map(|register| {
                let register = *register;
                Box::new(move |registry: &mut Registry| register(registry)) as Registration
            })
            .collect())
    }
}

/// Declarative plugins read from manifest files.
///
/// Each directory is searched one level deep: a manifest directly inside it,
/// or inside any of its immediate subdirectories. Manifests are registered in
/// path order so discovery is deterministic.
#[derive(Debug, Clone)]
pub struct ManifestSource {
    dirs: Vec<PathBuf>,
    file_names: Vec<String>,
}

impl ManifestSource {
    pub fn new(dirs: Vec<PathBuf>, file_names: Vec<String>) -> Self {
        Self { dirs, file_names }
    }

    pub fn from_config(config: &BootstrapConfig) -> Self {
        Self::new(config.plugin_dirs.clone(), config.manifest_names.clone())
    }

    fn is_manifest(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.file_names.iter().any(|candidate| candidate == name))
    }

    /// Find every manifest file under the configured directories.
    pub async fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        for dir in &self.dirs {
            let exists = fs::try_exists(dir)
                .await
                .map_err(|e| Error::io(e, "check plugin directory", dir.clone()))?;
            if !exists {
                log::warn!("Plugin directory does not exist, skipping: {}", dir.display());
                continue;
            }

            let mut entries = fs::read_dir(dir)
                .await
                .map_err(|e| Error::io(e, "read plugin directory", dir.clone()))?;
            let mut dir_found = Vec::new();

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| Error::io(e, "read plugin directory entry", dir.clone()))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| Error::io(e, "inspect plugin directory entry", path.clone()))?;

                if file_type.is_file() && self.is_manifest(&path) {
                    dir_found.push(path);
                } else if file_type.is_dir() {
                    for file_name in &self.file_names {
                        let candidate = path.join(file_name);
                        let exists = fs::try_exists(&candidate)
                            .await
                            .map_err(|e| Error::io(e, "check manifest file", candidate.clone()))?;
                        if exists {
                            dir_found.push(candidate);
                        }
                    }
                }
            }

            dir_found.sort();
            log::debug!("Found {} manifests in {}", dir_found.len(), dir.display());
            found.extend(dir_found);
        }

        Ok(found)
    }
}

#[async_trait]
impl PluginSource for ManifestSource {
    fn name(&self) -> &str {
        "manifests"
    }

    async fn registrations(&self) -> Result<Vec<Registration>> {
        let mut registrations = Vec::new();
        for path in self.discover().await? {
            let manifest = PluginManifest::load(&path).await?;
            log::debug!("Loaded manifest for '{}' from {}", manifest.name, path.display());
            registrations.push(Box::new(move |registry: &mut Registry| manifest.register(registry)) as Registration);
        }
        Ok(registrations)
    }
}

/// Apply every source's registrations to `registry`, in source order.
///
/// Returns the number of registrations applied.
pub async fn load_all(registry: &mut Registry, sources: &[Box<dyn PluginSource>]) -> Result<usize> {
    let mut applied = 0;
    for source in sources {
        let registrations = source.registrations().await?;
        log::info!("Loading {} plugins from source '{}'", registrations.len(), source.name());
        for register in registrations {
            register(registry)?;
            applied += 1;
        }
    }
    Ok(applied)
}

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::injector::Injector;
use crate::kernel::error::{BoxError, Error, Result};
use crate::plugin_system::version::{VersionRange, parse_version};
use crate::query::Fields;

/// Callback run once when a plugin is initialized.
///
/// It receives the plugin's own context and the shared injector, through which
/// it exposes services to later plugins and resolves services exposed by
/// earlier ones.
pub type Initializer =
    Box<dyn FnMut(&PluginContext<'_>, &mut Injector) -> std::result::Result<(), BoxError> + Send + Sync>;

/// Metadata supplied when a plugin is registered.
///
/// `version` and `dependencies` are validated when the [`Plugin`] is built;
/// every other key is kept verbatim in `fields` for consuming code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub version: String,
    /// Plugin name -> semver range
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PluginMetadata {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Require plugin `name` at a version inside `range`.
    pub fn dependency(mut self, name: impl Into<String>, range: impl Into<String>) -> Self {
        self.dependencies.insert(name.into(), range.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// What an initializer can see of the plugin it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct PluginContext<'a> {
    pub name: &'a str,
    pub version: &'a Version,
    pub metadata: &'a PluginMetadata,
}

impl PluginContext<'_> {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.metadata.fields.get(key)
    }
}

/// One pluggable unit: identity, version, dependency ranges, graph links and initializer.
///
/// Links to other plugins are stored as names and looked up through the
/// [`Registry`](crate::plugin_system::Registry) that owns both ends.
pub struct Plugin {
    name: String,
    version: Version,
    requirements: IndexMap<String, VersionRange>,
    metadata: PluginMetadata,
    dependencies: IndexSet<String>,
    dependents: IndexSet<String>,
    initializer: Option<Initializer>,
    started: bool,
}

impl Plugin {
    /// Build a plugin, validating its name, version and dependency ranges.
    pub fn new(name: impl Into<String>, metadata: PluginMetadata) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }

        let version = parse_version(&metadata.version).map_err(|source| Error::InvalidVersion {
            plugin: name.clone(),
            source,
        })?;

        let requirements = metadata
            .dependencies
            .iter()
            .map(|(dependency, range)| {
                VersionRange::from_constraint(range)
                    .map(|range| (dependency.clone(), range))
                    .map_err(|source| Error::InvalidVersionRange {
                        plugin: name.clone(),
                        dependency: dependency.clone(),
                        source,
                    })
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        Ok(Self {
            name,
            version,
            requirements,
            metadata,
            dependencies: IndexSet::new(),
            dependents: IndexSet::new(),
            initializer: None,
            started: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    /// Declared dependency ranges, in declaration order.
    pub fn requirements(&self) -> &IndexMap<String, VersionRange> {
        &self.requirements
    }

    /// Plugins this one is linked to by the last resolve.
    pub fn dependencies(&self) -> &IndexSet<String> {
        &self.dependencies
    }

    /// Plugins linked to this one by the last resolve.
    pub fn dependents(&self) -> &IndexSet<String> {
        &self.dependents
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn has_initializer(&self) -> bool {
        self.initializer.is_some()
    }

    /// Attach the initialization callback, replacing any earlier one.
    pub fn initializer<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&PluginContext<'_>, &mut Injector) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        if self.initializer.is_some() {
            log::debug!("Replacing initializer of plugin '{}'", self.name);
        }
        self.initializer = Some(Box::new(callback));
        self
    }

    /// Run the initializer and mark the plugin started.
    ///
    /// A plugin without an initializer simply becomes started. If the callback
    /// fails the plugin stays unstarted and the callback's error is returned.
    pub fn initialize(&mut self, injector: &mut Injector) -> Result<()> {
        if self.started {
            return Err(Error::AlreadyStarted { name: self.name.clone() });
        }

        if let Some(callback) = self.initializer.as_mut() {
            let context = PluginContext {
                name: &self.name,
                version: &self.version,
                metadata: &self.metadata,
            };
            callback(&context, injector).map_err(|source| Error::Initializer {
                plugin: self.name.clone(),
                source,
            })?;
        }

        self.started = true;
        log::info!("Plugin initialized: {} v{}", self.name, self.version);
        Ok(())
    }

    pub(crate) fn link_dependency(&mut self, name: &str) {
        self.dependencies.insert(name.to_string());
    }

    pub(crate) fn link_dependent(&mut self, name: &str) {
        self.dependents.insert(name.to_string());
    }
}

impl Fields for Plugin {
    /// `name`, `version` and `started` are always present; anything else comes
    /// from the metadata fields.
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::from(self.name.as_str())),
            "version" => Some(Value::from(self.version.to_string())),
            "started" => Some(Value::from(self.started)),
            _ => self.metadata.fields.get(key).cloned(),
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("version", &self.version.to_string())
            .field("dependencies", &self.dependencies)
            .field("dependents", &self.dependents)
            .field("has_initializer", &self.initializer.is_some())
            .field("started", &self.started)
            .finish()
    }
}

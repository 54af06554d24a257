use std::collections::HashSet;

use indexmap::IndexMap;
use indexmap::map::Entry;
use thiserror::Error as ThisError;

use crate::injector::Injector;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::collection::PluginCollection;
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::plugin::{Plugin, PluginMetadata};
use crate::query::Predicate;

/// The bootstrap pipeline's phases, in the order they must complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ThisError)]
pub enum BootstrapPhase {
    #[error("load")]
    Load,
    #[error("resolve")]
    Resolve,
    #[error("prioritize")]
    Prioritize,
    #[error("initialize")]
    Initialize,
}

/// Registry for managing plugins
///
/// Owns every registered [`Plugin`] and the last computed initialization
/// order. The pipeline runs as [`resolve`](Self::resolve),
/// [`prioritize`](Self::prioritize), [`initialize`](Self::initialize); each
/// step refuses to run before the one it builds on, and any change to the
/// plugin set sends the registry back to [`BootstrapPhase::Load`].
#[derive(Debug)]
pub struct Registry {
    /// Registered plugins, in registration order
    plugins: IndexMap<String, Plugin>,
    /// Names in the last computed initialization order
    prioritized: Vec<String>,
    /// Last phase that completed successfully
    phase: BootstrapPhase,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            plugins: IndexMap::new(),
            prioritized: Vec::new(),
            phase: BootstrapPhase::Load,
        }
    }

    /// Register a new plugin and return it so an initializer can be attached.
    ///
    /// ```
    /// use plinth_core::{Injector, PluginMetadata, Registry};
    ///
    /// let mut registry = Registry::new();
    /// registry
    ///     .plugin("greeter", PluginMetadata::new("1.0.0"))?
    ///     .initializer(|_, injector| {
    ///         injector.value("greeting", "hello")?;
    ///         Ok(())
    ///     });
    ///
    /// let mut injector = Injector::new();
    /// registry.bootstrap(&mut injector)?;
    /// assert_eq!(*injector.get_as::<&str>("greeting")?, "hello");
    /// # Ok::<(), plinth_core::Error>(())
    /// ```
    pub fn plugin(&mut self, name: impl Into<String>, metadata: PluginMetadata) -> Result<&mut Plugin> {
        let plugin = Plugin::new(name, metadata)?;
        match self.plugins.entry(plugin.name().to_string()) {
            Entry::Occupied(entry) => Err(Error::DuplicatePlugin {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                log::debug!("Registered plugin: {} v{}", entry.key(), plugin.version());
                self.phase = BootstrapPhase::Load;
                Ok(entry.insert(plugin))
            }
        }
    }

    /// Store `plugin` under `name`, returning whatever was there before.
    ///
    /// The key must be the plugin's own name.
    pub fn set(&mut self, name: &str, plugin: Plugin) -> Result<Option<Plugin>> {
        if plugin.name() != name {
            return Err(Error::TypeMismatch {
                name: name.to_string(),
                expected: format!("plugin named '{}', found '{}'", name, plugin.name()),
            });
        }
        self.phase = BootstrapPhase::Load;
        Ok(self.plugins.insert(name.to_string(), plugin))
    }

    /// Move every plugin of `other` into this registry, keeping their order.
    ///
    /// Nothing is moved when any of the names is already taken.
    pub fn merge(&mut self, other: Registry) -> Result<usize> {
        if let Some(name) = other.names().find(|name| self.contains(name)) {
            return Err(Error::DuplicatePlugin { name: name.to_string() });
        }
        let moved = other.plugins.len();
        if moved > 0 {
            self.phase = BootstrapPhase::Load;
        }
        self.plugins.extend(other.plugins);
        Ok(moved)
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Plugin> {
        self.plugins.get_mut(name)
    }

    /// Remove a plugin. Returns false if there was none.
    ///
    /// Links other plugins hold to the removed one are left in place.
    pub fn del(&mut self, name: &str) -> bool {
        let removed = self.plugins.shift_remove(name).is_some();
        if removed {
            log::debug!("Removed plugin: {}", name);
            self.phase = BootstrapPhase::Load;
        }
        removed
    }

    /// Checks if a plugin with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Get all registered plugin names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Last phase that completed successfully.
    pub fn phase(&self) -> BootstrapPhase {
        self.phase
    }

    /// Every plugin, in registration order.
    pub fn registered(&self) -> PluginCollection<'_> {
        PluginCollection::new(self, self.plugins.values().collect())
    }

    /// Plugins in the last computed initialization order.
    ///
    /// Empty before [`prioritize`](Self::prioritize) has run. Plugins removed
    /// since then are skipped.
    pub fn prioritized(&self) -> PluginCollection<'_> {
        PluginCollection::new(
            self,
            self.prioritized.iter().filter_map(|name| self.plugins.get(name)).collect(),
        )
    }

    /// Query the last computed order.
    pub fn filter<P: Predicate<Plugin>>(&self, predicate: P) -> PluginCollection<'_> {
        self.prioritized().filter(predicate)
    }

    /// Link every plugin to the plugins it depends on.
    ///
    /// Each dependency must be registered and its version must satisfy the
    /// requested range. A plugin's dependencies are all checked before any of
    /// its links are written; links written for earlier plugins stay in place
    /// when a later one fails.
    pub fn resolve(&mut self) -> Result<()> {
        self.phase = BootstrapPhase::Load;
        let names: Vec<String> = self.plugins.keys().cloned().collect();

        for name in &names {
            let targets = self.check_requirements(name)?;
            for target in &targets {
                if let Some(dependency) = self.plugins.get_mut(target) {
                    dependency.link_dependent(name);
                }
                if let Some(plugin) = self.plugins.get_mut(name) {
                    plugin.link_dependency(target);
                }
            }
        }

        log::info!("Resolved dependencies for {} plugins", names.len());
        self.phase = BootstrapPhase::Resolve;
        Ok(())
    }

    /// Validate one plugin's requirements, returning the names to link.
    fn check_requirements(&self, name: &str) -> Result<Vec<String>> {
        let Some(plugin) = self.plugins.get(name) else {
            return Ok(Vec::new());
        };

        plugin
            .requirements()
            .iter()
            .map(|(dependency_name, range)| -> Result<String> {
                let dependency = self.plugins.get(dependency_name).ok_or_else(|| {
                    DependencyError::MissingDependency {
                        plugin: name.to_string(),
                        dependency: dependency_name.clone(),
                    }
                })?;
                if !range.includes(dependency.version()) {
                    return Err(DependencyError::VersionMismatch {
                        plugin: name.to_string(),
                        dependency: dependency_name.clone(),
                        version: dependency.version().clone(),
                        range: range.clone(),
                    }
                    .into());
                }
                Ok(dependency_name.clone())
            })
            .collect()
    }

    /// Compute an initialization order where every plugin follows its dependencies.
    ///
    /// Works in passes: each pass moves every plugin whose linked dependencies
    /// are all already ordered. The first pass therefore takes exactly the
    /// plugins without dependencies. Plugins that become ready in the same pass
    /// keep their registration order. A pass that moves nothing means the
    /// remaining plugins sit on a cycle or on a dangling link.
    pub fn prioritize(&mut self) -> Result<()> {
        self.require(BootstrapPhase::Prioritize, BootstrapPhase::Resolve)?;

        let mut ordered: Vec<String> = Vec::with_capacity(self.plugins.len());
        let mut placed: HashSet<&str> = HashSet::with_capacity(self.plugins.len());
        let mut remaining: Vec<&Plugin> = self.plugins.values().collect();
        let mut passes = 0usize;

        while !remaining.is_empty() {
            passes += 1;
            let (ready, blocked): (Vec<&Plugin>, Vec<&Plugin>) = remaining
                .into_iter()
                .partition(|plugin| plugin.dependencies().iter().all(|d| placed.contains(d.as_str())));

            if ready.is_empty() {
                let stuck: Vec<String> = blocked.iter().map(|p| p.name().to_string()).collect();
                log::warn!("Dependency ordering stalled after {} passes: {:?}", passes, stuck);
                self.phase = BootstrapPhase::Resolve;
                return Err(DependencyError::CyclicDependency(stuck).into());
            }

            for plugin in ready {
                placed.insert(plugin.name());
                ordered.push(plugin.name().to_string());
            }
            remaining = blocked;
        }

        log::info!("Initialization order: {:?}", ordered);
        self.prioritized = ordered;
        self.phase = BootstrapPhase::Prioritize;
        Ok(())
    }

    /// Initialize every plugin in the last computed order, one after another.
    ///
    /// Stops at the first failure; plugins initialized before it stay started.
    pub fn initialize(&mut self, injector: &mut Injector) -> Result<()> {
        self.require(BootstrapPhase::Initialize, BootstrapPhase::Prioritize)?;

        for name in &self.prioritized {
            let Some(plugin) = self.plugins.get_mut(name) else {
                continue;
            };
            log::debug!("Initializing plugin: {}", name);
            if let Err(e) = plugin.initialize(injector) {
                log::error!("Failed to initialize plugin {}: {}", name, e);
                return Err(e);
            }
        }

        log::info!("All {} plugins initialized successfully.", self.prioritized.len());
        self.phase = BootstrapPhase::Initialize;
        Ok(())
    }

    /// Run resolve, prioritize and initialize in order.
    pub fn bootstrap(&mut self, injector: &mut Injector) -> Result<()> {
        self.resolve()?;
        self.prioritize()?;
        self.initialize(injector)
    }

    fn require(&self, attempted: BootstrapPhase, required: BootstrapPhase) -> Result<()> {
        if self.phase < required {
            return Err(Error::PhaseOrder {
                attempted,
                required,
                current: self.phase,
            });
        }
        Ok(())
    }
}

use crate::plugin_system::plugin::Plugin;
use crate::plugin_system::registry::Registry;
use crate::query::Predicate;

/// An ordered view over plugins owned by a [`Registry`].
#[derive(Debug, Clone)]
pub struct PluginCollection<'a> {
    registry: &'a Registry,
    plugins: Vec<&'a Plugin>,
}

impl<'a> PluginCollection<'a> {
    pub(crate) fn new(registry: &'a Registry, plugins: Vec<&'a Plugin>) -> Self {
        Self { registry, plugins }
    }

    /// The registry these plugins belong to.
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Narrow the collection, keeping order.
    pub fn filter<P: Predicate<Plugin>>(&self, predicate: P) -> Self {
        Self {
            registry: self.registry,
            plugins: self.plugins.iter().copied().filter(|p| predicate.test(p)).collect(),
        }
    }

    /// The plugins themselves, in collection order.
    pub fn values(&self) -> Vec<&'a Plugin> {
        self.plugins.clone()
    }

    pub fn map<R, F: FnMut(&'a Plugin) -> R>(&self, f: F) -> Vec<R> {
        self.plugins.iter().copied().map(f).collect()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.map(Plugin::name)
    }

    /// Index of the plugin called `name`, if it is in the collection.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.plugins.iter().position(|p| p.name() == name)
    }

    pub fn get(&self, index: usize) -> Option<&'a Plugin> {
        self.plugins.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Plugin> + '_ {
        self.plugins.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl<'a> IntoIterator for PluginCollection<'a> {
    type Item = &'a Plugin;
    type IntoIter = std::vec::IntoIter<&'a Plugin>;

    fn into_iter(self) -> Self::IntoIter {
        self.plugins.into_iter()
    }
}

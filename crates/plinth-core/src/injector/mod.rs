//! # Plinth Core Injector
//!
//! A named-descriptor container. Each [`Descriptor`] tells the [`Injector`] how
//! to supply one service: a [`factory`](DescriptorKind::Factory) runs on first
//! request and its result is memoized for the lifetime of the injector, a
//! [`value`](DescriptorKind::Value) is handed out as stored.
//!
//! Plugins receive the injector in their initializer, register what they
//! expose, and look up what earlier plugins exposed. [`Injector::filter`]
//! returns a lazy [`DependencyCollection`] that resolves nothing until
//! [`values`](DependencyCollection::values) is called.
pub mod collection;
pub mod descriptor;

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::kernel::error::{Error, Result};
use crate::query::Predicate;

pub use collection::DependencyCollection;
pub use descriptor::{Descriptor, DescriptorKind, Provider};

/// A resolved service, shared by everyone who asks for it.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Container mapping service names to descriptors.
///
/// Descriptors are kept in registration order, which is the order every
/// [`DependencyCollection`] reports them in.
#[derive(Default)]
pub struct Injector {
    descriptors: IndexMap<String, Descriptor>,
    /// Memoized factory results
    cache: RwLock<HashMap<String, Instance>>,
    /// Factories currently running, per thread
    resolving: Mutex<HashSet<(ThreadId, String)>>,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own name.
    pub fn register(&mut self, descriptor: Descriptor) -> Result<()> {
        match self.descriptors.entry(descriptor.name().to_string()) {
            Entry::Occupied(entry) => Err(Error::DuplicateDescriptor {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                log::debug!("Registered {} descriptor '{}'", descriptor.kind(), entry.key());
                entry.insert(descriptor);
                Ok(())
            }
        }
    }

    /// Register a memoized factory.
    pub fn factory<T, F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        self.register(Descriptor::factory(name, factory))
    }

    /// Register a plain value.
    pub fn value<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) -> Result<()> {
        self.register(Descriptor::value(name, value))
    }

    /// Resolve `name` to its instance.
    ///
    /// A factory is invoked on the first request only; every later request gets
    /// the cached instance. Errors raised by the factory are returned as-is and
    /// nothing is cached, so a later call tries again. A factory that asks for
    /// its own name, directly or through other factories, fails with
    /// [`Error::CyclicFactory`].
    pub fn get(&self, name: &str) -> Result<Instance> {
        let descriptor = self.descriptors.get(name).ok_or_else(|| Error::UnresolvedName {
            name: name.to_string(),
        })?;

        match descriptor.provider() {
            Provider::Value(value) => Ok(value.clone()),
            Provider::Factory(factory) => {
                if let Some(instance) = self.cache.read().unwrap_or_else(PoisonError::into_inner).get(name) {
                    return Ok(instance.clone());
                }
                // No lock is held while the factory runs, so it may resolve
                // other names through this injector.
                let _guard = ResolveGuard::enter(&self.resolving, name)?;
                log::debug!("Producing instance for '{}'", name);
                let instance = factory(self)?;
                let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
                Ok(cache.entry(name.to_string()).or_insert(instance).clone())
            }
        }
    }

    /// Resolve `name` and downcast it to `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| Error::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// Descriptors accepted by `predicate`, in registration order.
    pub fn filter<P: Predicate<Descriptor>>(&self, predicate: P) -> DependencyCollection<'_> {
        DependencyCollection::new(
            self,
            self.descriptors.values().filter(|d| predicate.test(d)).collect(),
        )
    }

    /// Every descriptor, in registration order.
    pub fn all(&self) -> DependencyCollection<'_> {
        DependencyCollection::new(self, self.descriptors.values().collect())
    }

    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.descriptors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Marks a factory as running on the current thread until dropped.
struct ResolveGuard<'a> {
    resolving: &'a Mutex<HashSet<(ThreadId, String)>>,
    key: (ThreadId, String),
}

impl<'a> ResolveGuard<'a> {
    fn enter(resolving: &'a Mutex<HashSet<(ThreadId, String)>>, name: &str) -> Result<Self> {
        let key = (thread::current().id(), name.to_string());
        let inserted = resolving
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        if !inserted {
            log::warn!("Factory for '{}' requested its own instance", name);
            return Err(Error::CyclicFactory { name: name.to_string() });
        }
        Ok(Self { resolving, key })
    }
}

impl Drop for ResolveGuard<'_> {
    fn drop(&mut self) {
        self.resolving
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("descriptors", &self.descriptors.values().collect::<Vec<_>>())
            .finish()
    }
}

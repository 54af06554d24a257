use std::any::Any;
use std::sync::Arc;

use crate::injector::{Descriptor, Injector, Instance};
use crate::kernel::error::Result;
use crate::query::Predicate;

/// An ordered view over some of an injector's descriptors.
///
/// Building or narrowing the collection never resolves anything; instances are
/// produced only by [`values`](Self::values).
#[derive(Debug, Clone)]
pub struct DependencyCollection<'a> {
    injector: &'a Injector,
    descriptors: Vec<&'a Descriptor>,
}

impl<'a> DependencyCollection<'a> {
    pub(crate) fn new(injector: &'a Injector, descriptors: Vec<&'a Descriptor>) -> Self {
        Self { injector, descriptors }
    }

    /// The injector this collection resolves through.
    pub fn injector(&self) -> &'a Injector {
        self.injector
    }

    /// Narrow the collection, keeping order.
    pub fn filter<P: Predicate<Descriptor>>(&self, predicate: P) -> Self {
        Self {
            injector: self.injector,
            descriptors: self
                .descriptors
                .iter()
                .copied()
                .filter(|d| predicate.test(d))
                .collect(),
        }
    }

    /// Resolve every descriptor through the injector, in collection order.
    /// Stops at the first resolution error.
    pub fn values(&self) -> Result<Vec<Instance>> {
        self.descriptors
            .iter()
            .map(|d| self.injector.get(d.name()))
            .collect()
    }

    /// Like [`values`](Self::values), downcasting each instance to `T`.
    pub fn values_as<T: Any + Send + Sync>(&self) -> Result<Vec<Arc<T>>> {
        self.descriptors
            .iter()
            .map(|d| self.injector.get_as::<T>(d.name()))
            .collect()
    }

    pub fn map<R, F: FnMut(&'a Descriptor) -> R>(&self, f: F) -> Vec<R> {
        self.descriptors.iter().copied().map(f).collect()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.map(Descriptor::name)
    }

    pub fn get(&self, index: usize) -> Option<&'a Descriptor> {
        self.descriptors.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Descriptor> + '_ {
        self.descriptors.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl<'a> IntoIterator for DependencyCollection<'a> {
    type Item = &'a Descriptor;
    type IntoIter = std::vec::IntoIter<&'a Descriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

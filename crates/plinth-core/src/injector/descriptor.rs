use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::injector::{Injector, Instance};
use crate::kernel::error::Result;
use crate::query::Fields;

type FactoryFn = dyn Fn(&Injector) -> Result<Instance> + Send + Sync;

/// How a descriptor supplies its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DescriptorKind {
    /// Produced on first request, then memoized
    Factory,
    /// Stored as-is
    Value,
}

impl DescriptorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorKind::Factory => "factory",
            DescriptorKind::Value => "value",
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The producer behind a descriptor.
#[derive(Clone)]
pub enum Provider {
    Factory(Arc<FactoryFn>),
    Value(Instance),
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Factory(_) => f.write_str("Factory(..)"),
            Provider::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// A named record telling the [`Injector`] how to supply one service.
///
/// Besides its name and kind, a descriptor can carry arbitrary fields that
/// structural filters match against:
///
/// ```
/// use plinth_core::{Descriptor, Injector, Match};
///
/// let mut injector = Injector::new();
/// injector.register(Descriptor::value("json", "application/json").with_field("codec", true)).unwrap();
/// injector.register(Descriptor::value("port", 8080u16)).unwrap();
///
/// let codecs = injector.filter(Match::new().field("codec", true));
/// assert_eq!(codecs.names(), vec!["json"]);
/// ```
#[derive(Debug, Clone)]
pub struct Descriptor {
    name: String,
    provider: Provider,
    fields: Map<String, Value>,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, provider: Provider) -> Self {
        Self {
            name: name.into(),
            provider,
            fields: Map::new(),
        }
    }

    /// A descriptor whose value is produced by `factory` the first time it is requested.
    pub fn factory<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Injector) -> Result<T> + Send + Sync + 'static,
    {
        let produce = move |injector: &Injector| -> Result<Instance> {
            factory(injector).map(|value| Arc::new(value) as Instance)
        };
        Self::new(name, Provider::Factory(Arc::new(produce)))
    }

    /// A descriptor wrapping an existing value.
    pub fn value<T: Any + Send + Sync>(name: impl Into<String>, value: T) -> Self {
        Self::new(name, Provider::Value(Arc::new(value)))
    }

    /// A descriptor wrapping an already shared instance.
    pub fn instance(name: impl Into<String>, instance: Instance) -> Self {
        Self::new(name, Provider::Value(instance))
    }

    /// Attach a field used by structural filters.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DescriptorKind {
        match self.provider {
            Provider::Factory(_) => DescriptorKind::Factory,
            Provider::Value(_) => DescriptorKind::Value,
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Fields for Descriptor {
    /// `name` and `kind` are always present; anything else comes from the
    /// attached fields.
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::from(self.name.as_str())),
            "kind" => Some(Value::from(self.kind().as_str())),
            _ => self.fields.get(key).cloned(),
        }
    }
}

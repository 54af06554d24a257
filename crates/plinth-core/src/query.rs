//! Predicates shared by the injector and plugin collections.
//!
//! A collection can be narrowed either with a closure over its items or with a
//! [`Match`], a structural pattern where every key/value pair must equal the
//! item's field of the same name.
//!
//! ```
//! use plinth_core::{Match, Predicate, Fields};
//! use serde_json::{json, Value};
//!
//! struct Tagged(bool);
//! impl Fields for Tagged {
//!     fn field(&self, key: &str) -> Option<Value> {
//!         (key == "enabled").then(|| json!(self.0))
//!     }
//! }
//!
//! let enabled = Match::new().field("enabled", true);
//! assert!(enabled.test(&Tagged(true)));
//! assert!(!enabled.test(&Tagged(false)));
//! ```
use serde_json::{Map, Value};

/// Exposes named fields of an item for structural matching.
pub trait Fields {
    /// The value of `key`, or `None` when the item has no such field.
    fn field(&self, key: &str) -> Option<Value>;
}

/// A test applied to each item of a collection.
pub trait Predicate<T: ?Sized> {
    fn test(&self, item: &T) -> bool;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    fn test(&self, item: &T) -> bool {
        self(item)
    }
}

/// Structural pattern: matches items whose fields equal every pair listed.
///
/// An empty pattern matches everything. A field missing on the item never
/// matches, not even `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    fields: Map<String, Value>,
}

impl Match {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required `key == value` pair.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builds a pattern from a JSON object. Returns `None` for any other JSON value.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Match {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl<T: Fields + ?Sized> Predicate<T> for Match {
    fn test(&self, item: &T) -> bool {
        self.fields
            .iter()
            .all(|(key, expected)| item.field(key).as_ref() == Some(expected))
    }
}

//! Identifier bindings for a single evaluation.

use super::{Activation, TypeAdapter};
use crate::reflect::Reflect;
use crate::values::Value;
use hashbrown::HashMap;

/// Activation backed by a name → value map.
#[derive(Debug, Default, Clone)]
pub struct MapActivation {
    bindings: HashMap<String, Value>,
}

impl MapActivation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    /// Binds a host value, adapting it with `adapter`.
    pub fn insert_native(&mut self, name: &str, value: &dyn Reflect, adapter: &dyn TypeAdapter) {
        self.insert(name, adapter.native_to_value(value));
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }
}

impl Activation for MapActivation {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }
}

impl<'a> FromIterator<(&'a str, Value)> for MapActivation {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        MapActivation {
            bindings: iter
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

/// Looks names up in `child` first, then in `parent`.
pub struct HierarchicalActivation<'a> {
    parent: &'a dyn Activation,
    child: &'a dyn Activation,
}

impl<'a> HierarchicalActivation<'a> {
    pub fn new(parent: &'a dyn Activation, child: &'a dyn Activation) -> Self {
        Self { parent, child }
    }
}

impl Activation for HierarchicalActivation<'_> {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.child
            .resolve(name)
            .or_else(|| self.parent.resolve(name))
    }
}

/// Resolves nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyActivation;

impl Activation for EmptyActivation {
    fn resolve(&self, _name: &str) -> Option<Value> {
        None
    }
}

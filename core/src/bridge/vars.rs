use crate::api::{Activation, VariableDecl};
use crate::types::Type;
use crate::values::Value;
use std::collections::BTreeMap;

/// A registered name.
#[derive(Debug, Clone)]
pub struct VariableEntry {
    pub name: String,
    pub ty: Type,
    /// `None` for declarations whose value comes from the activation.
    pub value: Option<Value>,
}

/// Registered variables, first registration wins.
#[derive(Debug, Default)]
pub struct VariableStore {
    entries: BTreeMap<String, VariableEntry>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the entry unless `name` is taken. Returns whether it was stored.
    pub fn insert(&mut self, name: &str, ty: Type, value: Option<Value>) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(
            name.to_string(),
            VariableEntry {
                name: name.to_string(),
                ty,
                value,
            },
        );
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&VariableEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declarations of every entry, sorted by name.
    pub fn declarations(&self) -> Vec<VariableDecl> {
        self.entries
            .values()
            .map(|e| VariableDecl {
                name: e.name.clone(),
                ty: e.ty.clone(),
            })
            .collect()
    }
}

impl Activation for VariableStore {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.entries.get(name).and_then(|e| e.value.clone())
    }
}

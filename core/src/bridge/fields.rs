//! External field names of native structs.

use super::type_mapper::is_supported;
use crate::reflect::{FieldInfo, HostType};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// A field as seen by expressions.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Name resolved under the naming convention.
    pub name: String,
    /// Position in the struct's declared field list.
    pub index: usize,
    pub host: HostType,
    pub info: &'static FieldInfo,
}

/// External name → descriptor, sorted by name.
pub type FieldMap = BTreeMap<String, FieldDescriptor>;

/// Memoizes the field maps of struct types per naming convention.
///
/// Struct shapes never change at runtime, so entries are never invalidated.
#[derive(Default)]
pub struct StructFieldIndex {
    cache: RwLock<HashMap<String, HashMap<TypeId, Arc<FieldMap>>>>,
}

impl StructFieldIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields of `host` (behind any pointers) under `convention`.
    ///
    /// Non-struct types have no fields.
    pub fn fields(&self, host: &HostType, convention: &str) -> Arc<FieldMap> {
        let host = host.deref();
        if let Some(found) = self
            .cache
            .read()
            .get(convention)
            .and_then(|types| types.get(&host.id()))
        {
            return found.clone();
        }
        let built = Arc::new(build(host, convention));
        trace!(host = %host, convention, fields = built.len(), "Indexed struct fields");
        self.cache
            .write()
            .entry(convention.to_string())
            .or_default()
            .entry(host.id())
            .or_insert(built)
            .clone()
    }

    pub fn field(&self, host: &HostType, convention: &str, name: &str) -> Option<FieldDescriptor> {
        self.fields(host, convention).get(name).cloned()
    }
}

fn build(host: &HostType, convention: &str) -> FieldMap {
    let Some(info) = host.as_struct() else {
        return FieldMap::new();
    };
    let mut fields = FieldMap::new();
    for (index, field) in info.fields.iter().enumerate() {
        if !field.exported {
            continue;
        }
        let Some(name) = external_name(field, convention) else {
            continue;
        };
        let field_host = (field.ty)();
        if !is_supported(&field_host) {
            continue;
        }
        fields.insert(
            name.to_string(),
            FieldDescriptor {
                name: name.to_string(),
                index,
                host: field_host,
                info: field,
            },
        );
    }
    fields
}

/// Name of `field` under `convention`, or `None` if the field is hidden.
///
/// With an empty convention the declared identifier is used. Otherwise the
/// tag text before the first comma names the field, `-` hides it, and an
/// empty or missing tag falls back to the identifier.
pub fn external_name(field: &FieldInfo, convention: &str) -> Option<&'static str> {
    if convention.is_empty() {
        return Some(field.name);
    }
    let Some(tag) = field.tag(convention) else {
        return Some(field.name);
    };
    match tag.split_once(',').map_or(tag, |(name, _)| name) {
        "-" => None,
        "" => Some(field.name),
        name => Some(name),
    }
}

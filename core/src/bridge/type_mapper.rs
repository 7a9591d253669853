//! Host type descriptors to engine types.

use super::RegistrationError;
use crate::reflect::{HostKind, HostType};
use crate::types::{Traits, Type};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use tracing::trace;

/// Capabilities every native struct object supports.
pub const STRUCT_TRAITS: Traits = Traits::FIELD_TESTER.union(Traits::INDEXER);

/// Maps host types to engine types, memoized by `TypeId`.
///
/// The engine identifies object types by name, so a host type must always
/// map to the same descriptor. The cache guarantees that even when the
/// mapping is first requested concurrently.
#[derive(Default)]
pub struct TypeMapper {
    cache: RwLock<HashMap<TypeId, Type>>,
}

impl TypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_type(&self, host: &HostType) -> Result<Type, RegistrationError> {
        if let Some(found) = self.cache.read().get(&host.id()) {
            return Ok(found.clone());
        }
        // Component types are mapped (and cached) before the lock is taken.
        let ty = self.compute(host)?;
        trace!(host = %host, ty = %ty, "Mapped host type");
        Ok(self.cache.write().entry(host.id()).or_insert(ty).clone())
    }

    /// Like [`map_type`](Self::map_type), but rejects types that map to null.
    pub fn map_specified(&self, host: &HostType) -> Result<Type, RegistrationError> {
        let ty = self.map_type(host)?;
        if ty.is_null() {
            return Err(RegistrationError::UnspecifiedType(host.name().to_string()));
        }
        Ok(ty)
    }

    fn compute(&self, host: &HostType) -> Result<Type, RegistrationError> {
        Ok(match host.kind() {
            HostKind::Unit => Type::null(),
            HostKind::Bool => Type::bool(),
            HostKind::Int(_) => Type::int(),
            HostKind::Uint(_) => Type::uint(),
            HostKind::Float(_) => Type::double(),
            HostKind::String => Type::string(),
            HostKind::List { elem, .. } if elem.is::<u8>() => Type::bytes(),
            HostKind::List { elem, .. } => Type::list(self.map_type(elem)?),
            HostKind::Map { key, value } => Type::map(self.map_type(key)?, self.map_type(value)?),
            HostKind::Pointer { elem, .. } => self.map_type(elem)?,
            HostKind::Optional { elem, .. } => Type::nullable(self.map_type(elem)?),
            HostKind::Struct(_) => object_type(host),
            HostKind::Timestamp => Type::timestamp(),
            HostKind::Duration => Type::duration(),
            HostKind::Value | HostKind::Error => Type::dyn_(),
            HostKind::Channel | HostKind::Function | HostKind::UnsafePointer => {
                return Err(RegistrationError::UnsupportedType(host.name().to_string()));
            }
        })
    }
}

/// The engine object type of a struct host type.
pub fn object_type(host: &HostType) -> Type {
    Type::object(host.qualified_name(), STRUCT_TRAITS)
}

/// False for types with no engine representation, checked through
/// collections and pointers.
pub fn is_supported(host: &HostType) -> bool {
    match host.kind() {
        HostKind::Channel | HostKind::Function | HostKind::UnsafePointer => false,
        HostKind::List { elem, .. }
        | HostKind::Pointer { elem, .. }
        | HostKind::Optional { elem, .. } => is_supported(elem),
        HostKind::Map { key, value } => is_supported(key) && is_supported(value),
        _ => true,
    }
}

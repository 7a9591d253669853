//! Extension points through which a library plugs into the engine.
//!
//! - [`TypeAdapter`]: turns host values into engine values.
//! - [`TypeProvider`]: resolves type names, object fields and construction.
//! - [`Activation`]: supplies identifier values during evaluation.
//!
//! [`BuiltinAdapter`] and [`BuiltinProvider`] cover the engine's own types and
//! serve as fallbacks for libraries that only handle part of the space.

use crate::evaluator::EvalError;
use crate::reflect::{Reflect, ReflectRef};
use crate::types::Type;
use crate::values::{MapKey, Value};

pub trait TypeAdapter: Send + Sync {
    fn native_to_value(&self, value: &dyn Reflect) -> Value;
}

pub trait TypeProvider: Send + Sync {
    /// Value of a well-known identifier, such as a type name.
    fn find_ident(&self, name: &str) -> Option<Value>;

    fn find_struct_type(&self, name: &str) -> Option<Type>;

    fn find_field_type(&self, type_name: &str, field: &str) -> Option<Type>;

    /// Builds an object from field values; returns an error value on failure.
    fn new_value(&self, type_name: &str, fields: &[(String, Value)]) -> Value;
}

pub trait Activation {
    fn resolve(&self, name: &str) -> Option<Value>;
}

// ============================================================================
// Builtins
// ============================================================================

/// Adapts scalars, strings, bytes, time values and collections of them.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinAdapter;

impl TypeAdapter for BuiltinAdapter {
    fn native_to_value(&self, value: &dyn Reflect) -> Value {
        match value.reflect_ref() {
            ReflectRef::Unit => Value::Null,
            ReflectRef::Bool(b) => Value::Bool(b),
            ReflectRef::Int(i) => Value::Int(i),
            ReflectRef::Uint(u) => Value::Uint(u),
            ReflectRef::Float(f) => Value::Double(f),
            ReflectRef::String(s) => Value::string(s),
            ReflectRef::Bytes(b) => Value::bytes(b),
            ReflectRef::Timestamp(ts) => Value::Timestamp(ts),
            ReflectRef::Duration(Some(d)) => Value::Duration(d),
            ReflectRef::Duration(None) => {
                Value::error(EvalError::Overflow("duration".to_string()))
            }
            ReflectRef::Value(v) => v.clone(),
            ReflectRef::Pointer(None) => Value::Null,
            ReflectRef::Pointer(Some(inner)) => self.native_to_value(inner),
            ReflectRef::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let v = self.native_to_value(item);
                    if v.is_error() {
                        return v;
                    }
                    out.push(v);
                }
                Value::list(out)
            }
            ReflectRef::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let key = match MapKey::from_value(&self.native_to_value(k)) {
                        Ok(key) => key,
                        Err(e) => return Value::error(e),
                    };
                    let v = self.native_to_value(v);
                    if v.is_error() {
                        return v;
                    }
                    out.push((key, v));
                }
                Value::map(out)
            }
            ReflectRef::Struct | ReflectRef::Opaque => Value::error(EvalError::UnsupportedType(
                format!("type '{}' is not supported", value.reflect_type()),
            )),
        }
    }
}

/// Resolves the engine's built-in type names.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinProvider;

impl TypeProvider for BuiltinProvider {
    fn find_ident(&self, name: &str) -> Option<Value> {
        let ty = match name {
            "null_type" => Type::null(),
            "bool" => Type::bool(),
            "int" => Type::int(),
            "uint" => Type::uint(),
            "double" => Type::double(),
            "string" => Type::string(),
            "bytes" => Type::bytes(),
            "dyn" => Type::dyn_(),
            "type" => Type::type_(),
            "google.protobuf.Timestamp" => Type::timestamp(),
            "google.protobuf.Duration" => Type::duration(),
            _ => return None,
        };
        Some(Value::Type(ty))
    }

    fn find_struct_type(&self, _name: &str) -> Option<Type> {
        None
    }

    fn find_field_type(&self, _type_name: &str, _field: &str) -> Option<Type> {
        None
    }

    fn new_value(&self, type_name: &str, _fields: &[(String, Value)]) -> Value {
        Value::error(EvalError::UnknownType(type_name.to_string()))
    }
}

//! Engine objects backed by native structs.

use super::adapter::ValueAdapter;
use crate::evaluator::EvalError;
use crate::reflect::{HostKind, HostType, Reflect, ReflectRef, deep_equal, deref_pointers, is_zero};
use crate::syntax::operators::INDEX;
use crate::types::Type;
use crate::values::{Indexer, Object, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A native struct (or pointer to one) exposed to expressions.
///
/// Fields are read through the struct's field index; each read adapts the
/// field value afresh.
pub struct NativeObject {
    ty: Type,
    host: HostType,
    value: Arc<dyn Reflect>,
    adapter: ValueAdapter,
}

impl NativeObject {
    pub(crate) fn new(ty: Type, host: HostType, value: Arc<dyn Reflect>, adapter: ValueAdapter) -> Self {
        NativeObject {
            ty,
            host,
            value,
            adapter,
        }
    }

    /// The wrapped host value, as adapted.
    pub fn value(&self) -> &dyn Reflect {
        &*self.value
    }

    pub fn host_type(&self) -> &HostType {
        &self.host
    }

    /// The wrapped value with one `Box`, `Arc` or `Option` level removed.
    /// `None` for a nil pointer.
    fn unwrapped(&self) -> Option<&dyn Reflect> {
        if self.host.pointee().is_none() {
            return Some(&*self.value);
        }
        match self.value.reflect_ref() {
            ReflectRef::Pointer(inner) => inner,
            _ => Some(&*self.value),
        }
    }

    fn field(&self, name: &str) -> Result<&dyn Reflect, EvalError> {
        let no_such_field = || EvalError::NoSuchField(name.to_string());
        let fields = self.adapter.fields(&self.host);
        let descriptor = fields.get(name).ok_or_else(no_such_field)?;
        let target = deref_pointers(&*self.value).ok_or_else(no_such_field)?;
        (descriptor.info.get)(target).ok_or_else(no_such_field)
    }
}

impl Object for NativeObject {
    fn object_type(&self) -> Type {
        self.ty.clone()
    }

    /// Deep equality of the host values, each with at most one pointer
    /// level removed.
    fn equal(&self, other: &Value) -> bool {
        let Some(other) = other
            .as_object()
            .and_then(|o| o.as_any().downcast_ref::<NativeObject>())
        else {
            return false;
        };
        if deep_equal(&*self.value, &*other.value) {
            return true;
        }
        match (self.unwrapped(), other.unwrapped()) {
            (Some(a), Some(b)) => deep_equal(a, b),
            _ => false,
        }
    }

    fn get_field(&self, name: &str) -> Value {
        match self.field(name) {
            Ok(field) => self.adapter.native_to_value(field),
            Err(e) => Value::error(e),
        }
    }

    fn has_field(&self, name: &str) -> Value {
        match self.field(name) {
            Ok(field) => Value::Bool(!is_zero(field)),
            Err(e) => Value::error(e),
        }
    }

    fn native(&self) -> Option<&dyn Reflect> {
        Some(&*self.value)
    }

    /// Exact type, or one pointer level in either direction.
    fn convert_to_native(&self, target: &HostType) -> Result<Box<dyn Reflect>, EvalError> {
        if self.host == *target {
            return Ok(self.value.clone_reflect());
        }
        if self.host.pointee() == Some(target) {
            if let ReflectRef::Pointer(Some(inner)) = self.value.reflect_ref() {
                return Ok(inner.clone_reflect());
            }
        }
        if let HostKind::Pointer { elem, wrap } | HostKind::Optional { elem, wrap } = target.kind() {
            if *elem == self.host {
                if let Some(wrapped) = wrap(self.value.clone_reflect()) {
                    return Ok(wrapped);
                }
            }
        }
        Err(EvalError::conversion(&self.ty, target.name()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_indexer(&self) -> Option<&dyn Indexer> {
        Some(self)
    }
}

impl Indexer for NativeObject {
    fn get(&self, index: &Value) -> Value {
        match index.as_str() {
            Some(name) => self.get_field(name),
            None => Value::error(EvalError::NoSuchOverload {
                function: INDEX.to_string(),
                args: format!("{}, {}", self.ty, index.ty()),
            }),
        }
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeObject")
            .field("ty", &self.ty)
            .field("host", &self.host)
            .finish()
    }
}

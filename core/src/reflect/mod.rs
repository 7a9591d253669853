//! Runtime reflection over host values.
//!
//! Rust has no built-in runtime reflection, so host values describe
//! themselves through three traits:
//!
//! - [`Typed`]: static access to a type's [`HostType`] descriptor.
//! - [`Reflect`]: object-safe access to a value's shape via [`ReflectRef`].
//! - [`FromValue`]: conversion from an engine [`Value`] back to the host type.
//!
//! Implementations are provided for scalars, strings, collections, pointers,
//! `Option`, chrono time values and the engine [`Value`] itself. Structs
//! derive all three with `#[derive(Native)]`.

mod equal;
mod host_type;
mod impls;


pub use equal::{deep_equal, is_zero};
pub use host_type::{HostKind, HostType, WrapFn};

use crate::evaluator::EvalError;
use crate::values::Value;
use chrono::{DateTime, FixedOffset, TimeDelta};
use std::any::Any;
use std::fmt;

use hostbind_types::Type;

/// Borrowed view of a reflected value's shape.
pub enum ReflectRef<'a> {
    Unit,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(&'a str),
    /// `Vec<u8>` and `[u8; N]`.
    Bytes(&'a [u8]),
    List(Vec<&'a dyn Reflect>),
    Map(Vec<(&'a dyn Reflect, &'a dyn Reflect)>),
    /// `Box`, `Arc` or `Option`; `None` is a nil pointer.
    Pointer(Option<&'a dyn Reflect>),
    /// Fields are reached through the [`StructInfo`] of the value's type.
    Struct,
    Timestamp(DateTime<FixedOffset>),
    /// `None` when the host duration is outside the engine's range.
    Duration(Option<TimeDelta>),
    Value(&'a Value),
    /// Channels, functions and other values with no inspectable shape.
    Opaque,
}

/// Static type information for a host type.
pub trait Typed {
    fn host_type() -> HostType;
}

/// Dynamic access to a host value.
pub trait Reflect: Any + Send + Sync {
    /// Descriptor of the concrete type of `self`.
    fn reflect_type(&self) -> HostType;

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn clone_reflect(&self) -> Box<dyn Reflect>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Engine type to use instead of the one derived from the host type.
    fn type_hint(&self) -> Option<Type> {
        None
    }
}

impl dyn Reflect {
    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Moves the value out if it is a `T`.
    pub fn downcast<T: Reflect>(self: Box<Self>) -> Result<T, Box<dyn Reflect>> {
        if self.is::<T>() {
            match self.into_any().downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(_) => unreachable!("type checked above"),
            }
        } else {
            Err(self)
        }
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.reflect_type())
    }
}

/// Conversion from an engine value into a host type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, EvalError>;
}

/// Follows non-nil pointers. Returns `None` at the first nil.
pub fn deref_pointers(mut value: &dyn Reflect) -> Option<&dyn Reflect> {
    loop {
        match value.reflect_ref() {
            ReflectRef::Pointer(Some(inner)) => value = inner,
            ReflectRef::Pointer(None) => return None,
            _ => return Some(value),
        }
    }
}

// ============================================================================
// Struct metadata
// ============================================================================

/// Reflection metadata for a struct with named fields.
#[derive(Clone, Copy)]
pub struct StructInfo {
    pub fields: &'static [FieldInfo],
    /// Builds a default instance; present for `#[native(default)]` structs.
    pub construct: Option<fn() -> Box<dyn Reflect>>,
}

impl StructInfo {
    pub fn field(&self, index: usize) -> Option<&'static FieldInfo> {
        self.fields.get(index)
    }
}

impl fmt::Debug for StructInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructInfo")
            .field("fields", &self.fields)
            .field("constructible", &self.construct.is_some())
            .finish()
    }
}

/// One declared field of a struct.
pub struct FieldInfo {
    /// Declared identifier.
    pub name: &'static str,
    /// True for `pub` fields.
    pub exported: bool,
    /// Naming-convention tags as `(convention, tag)` pairs.
    pub tags: &'static [(&'static str, &'static str)],
    pub ty: fn() -> HostType,
    pub get: fn(&dyn Reflect) -> Option<&dyn Reflect>,
    pub set: fn(&mut dyn Reflect, &Value) -> Result<(), EvalError>,
}

impl FieldInfo {
    pub fn tag(&self, convention: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(key, _)| *key == convention)
            .map(|(_, tag)| *tag)
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("exported", &self.exported)
            .field("tags", &self.tags)
            .finish()
    }
}

/// `FromValue` for derived structs: unwraps a native object of the right type.
pub fn struct_from_value<T: Reflect + Typed>(value: &Value) -> Result<T, EvalError> {
    let target = T::host_type();
    match value {
        Value::Object(obj) => obj
            .convert_to_native(&target)?
            .downcast::<T>()
            .map_err(|_| EvalError::conversion(obj.object_type(), target.name())),
        other => Err(EvalError::conversion(other.ty(), target.name())),
    }
}

//! Native ↔ engine value conversion.

use super::fields::{FieldMap, StructFieldIndex};
use super::native_object::NativeObject;
use super::type_mapper::TypeMapper;
use super::RegistrationError;
use crate::api::TypeAdapter;
use crate::evaluator::EvalError;
use crate::reflect::{HostType, Reflect, ReflectRef, Typed};
use crate::types::Type;
use crate::values::{MapKey, Value};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

type ConvertFn = dyn Fn(&dyn Reflect) -> Value + Send + Sync;

/// A user-supplied adaptation for one host type.
#[derive(Clone)]
pub struct ConversionRule {
    /// Engine type of the values the rule produces.
    pub ty: Type,
    convert: Arc<ConvertFn>,
}

impl ConversionRule {
    pub fn apply(&self, value: &dyn Reflect) -> Value {
        (self.convert)(value)
    }
}

impl fmt::Debug for ConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRule").field("ty", &self.ty).finish()
    }
}

struct AdapterInner {
    tag_name: String,
    mapper: TypeMapper,
    fields: StructFieldIndex,
    rules: RwLock<HashMap<TypeId, ConversionRule>>,
    base: Arc<dyn TypeAdapter>,
}

/// Converts host values to engine values and back.
///
/// Cloning is cheap; clones share the type and field caches and the
/// conversion rules. Native objects and function bindings keep a clone so
/// that nested values adapt under the same rules.
#[derive(Clone)]
pub struct ValueAdapter {
    inner: Arc<AdapterInner>,
}

impl ValueAdapter {
    /// `base` handles whatever the generic rules don't.
    pub fn new(tag_name: &str, base: Arc<dyn TypeAdapter>) -> Self {
        ValueAdapter {
            inner: Arc::new(AdapterInner {
                tag_name: tag_name.to_string(),
                mapper: TypeMapper::new(),
                fields: StructFieldIndex::new(),
                rules: RwLock::new(HashMap::new()),
                base,
            }),
        }
    }

    /// The naming convention used for struct fields.
    pub fn tag_name(&self) -> &str {
        &self.inner.tag_name
    }

    pub fn mapper(&self) -> &TypeMapper {
        &self.inner.mapper
    }

    /// Fields of a struct type under this adapter's naming convention.
    pub fn fields(&self, host: &HostType) -> Arc<FieldMap> {
        self.inner.fields.fields(host, &self.inner.tag_name)
    }

    /// Engine type of a struct field, or `None` if there is no such field.
    pub fn field_type(&self, host: &HostType, name: &str) -> Option<Type> {
        let field = self.fields(host).get(name)?.host.clone();
        self.engine_type(&field).ok()
    }

    /// Engine type of values of `host`: the type of its conversion rule if
    /// there is one, otherwise the mapped type.
    pub fn engine_type(&self, host: &HostType) -> Result<Type, RegistrationError> {
        if let Some(rule) = self.inner.rules.read().get(&host.id()) {
            return Ok(rule.ty.clone());
        }
        self.inner.mapper.map_type(host)
    }

    pub fn has_rule(&self, host: &HostType) -> bool {
        self.inner.rules.read().contains_key(&host.id())
    }

    /// Installs `convert` as the adaptation of every `T`.
    ///
    /// `ty` is the engine type the rule produces. There is at most one rule
    /// per type, and engine values can't have one.
    pub fn add_rule<T, F>(&self, ty: Type, convert: F) -> Result<(), RegistrationError>
    where
        T: Reflect + Typed,
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        let host = T::host_type();
        if host.is::<Value>() {
            return Err(RegistrationError::InvalidConversion(
                "conversion must not accept an engine value".to_string(),
            ));
        }
        let mut rules = self.inner.rules.write();
        if rules.contains_key(&host.id()) {
            return Err(RegistrationError::DuplicateConversion(host.name().to_string()));
        }
        let target = host.clone();
        let apply = move |value: &dyn Reflect| match value.downcast_ref::<T>() {
            Some(v) => convert(v),
            None => Value::error(EvalError::conversion(value.reflect_type(), target.name())),
        };
        debug!(host = %host, ty = %ty, "Installed conversion rule");
        rules.insert(
            host.id(),
            ConversionRule {
                ty,
                convert: Arc::new(apply),
            },
        );
        Ok(())
    }

    fn rule(&self, host: &HostType) -> Option<ConversionRule> {
        self.inner.rules.read().get(&host.id()).cloned()
    }

    /// Adapts a host value. Never fails; problems become error values.
    ///
    /// Resolution order:
    /// 1. nil → `Null`
    /// 2. engine values pass through
    /// 3. a conversion rule for the exact type
    /// 4. bytes → `Bytes`, other lists → `List`
    /// 5. maps → `Map`
    /// 6. timestamps → `Timestamp`
    /// 7. structs, possibly behind pointers → [`NativeObject`]
    /// 8. everything else → the base adapter
    pub fn native_to_value(&self, value: &dyn Reflect) -> Value {
        match value.reflect_ref() {
            ReflectRef::Pointer(None) => return Value::Null,
            ReflectRef::Value(v) => return v.clone(),
            _ => {}
        }
        let host = value.reflect_type();
        if let Some(rule) = self.rule(&host) {
            return rule.apply(value);
        }
        match value.reflect_ref() {
            ReflectRef::Bytes(bytes) => Value::bytes(bytes),
            ReflectRef::List(items) => self.adapt_list(items),
            ReflectRef::Map(entries) => self.adapt_map(entries),
            ReflectRef::Timestamp(ts) => Value::Timestamp(ts),
            _ if host.is_struct_like() => self.wrap(host, Arc::from(value.clone_reflect())),
            ReflectRef::Pointer(Some(inner)) => self.native_to_value(inner),
            _ => self.inner.base.native_to_value(value),
        }
    }

    /// Like [`native_to_value`](Self::native_to_value), but structs are
    /// wrapped without being cloned.
    pub fn adapt_owned<T: Reflect>(&self, value: T) -> Value {
        if self.wraps_in_place(&value) {
            return self.wrap(value.reflect_type(), Arc::new(value));
        }
        self.native_to_value(&value)
    }

    pub fn adapt_boxed(&self, value: Box<dyn Reflect>) -> Value {
        if self.wraps_in_place(&*value) {
            let host = value.reflect_type();
            return self.wrap(host, Arc::from(value));
        }
        self.native_to_value(&*value)
    }

    fn wraps_in_place(&self, value: &dyn Reflect) -> bool {
        match value.reflect_ref() {
            ReflectRef::Pointer(None) | ReflectRef::Value(_) => false,
            _ => {
                let host = value.reflect_type();
                host.is_struct_like() && !self.has_rule(&host)
            }
        }
    }

    fn wrap(&self, host: HostType, value: Arc<dyn Reflect>) -> Value {
        match self.inner.mapper.map_type(host.deref()) {
            Ok(ty) => Value::object(NativeObject::new(ty, host, value, self.clone())),
            Err(e) => Value::error(EvalError::UnsupportedType(e.to_string())),
        }
    }

    /// A failing element fails the whole collection.
    fn adapt_list(&self, items: Vec<&dyn Reflect>) -> Value {
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

    fn adapt_map(&self, entries: Vec<(&dyn Reflect, &dyn Reflect)>) -> Value {
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

    /// Converts an engine value to `target`.
    ///
    /// Native objects convert through [`NativeObject`] pointer rules; a
    /// `Value` target takes the value as-is. Typed conversions of plain
    /// values go through [`FromValue`](crate::reflect::FromValue).
    pub fn convert_to_native(
        &self,
        value: &Value,
        target: &HostType,
    ) -> Result<Box<dyn Reflect>, EvalError> {
        if target.is::<Value>() {
            return Ok(Box::new(value.clone()));
        }
        match value {
            Value::Object(obj) => obj.convert_to_native(target),
            other => Err(EvalError::conversion(other.ty(), target.name())),
        }
    }
}

impl TypeAdapter for ValueAdapter {
    fn native_to_value(&self, value: &dyn Reflect) -> Value {
        ValueAdapter::native_to_value(self, value)
    }
}

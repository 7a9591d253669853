//! Reflection for std and chrono types.

use super::{FromValue, HostKind, HostType, Reflect, ReflectRef, Typed};
use crate::evaluator::EvalError;
use crate::values::{MapKey, Value};
use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;
use std::sync::mpsc::{Sender, SyncSender};

/// The `Any` plumbing every `Reflect` impl shares.
macro_rules! reflect_any {
    () => {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    };
}

fn mismatch<T: Typed>(value: &Value) -> EvalError {
    EvalError::conversion(value.ty(), T::host_type().name())
}

// ============================================================================
// Scalars
// ============================================================================

macro_rules! impl_scalar {
    ($($t:ty => $kind:expr, $variant:ident as $repr:ty;)*) => {
        $(
            impl Typed for $t {
                fn host_type() -> HostType {
                    HostType::cached::<$t>(|| $kind)
                }
            }

            impl Reflect for $t {
                fn reflect_type(&self) -> HostType {
                    <$t as Typed>::host_type()
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::$variant(*self as $repr)
                }

                fn clone_reflect(&self) -> Box<dyn Reflect> {
                    Box::new(*self)
                }

                reflect_any!();
            }
        )*
    };
}

impl_scalar! {
    bool => HostKind::Bool, Bool as bool;
    i8 => HostKind::Int(8), Int as i64;
    i16 => HostKind::Int(16), Int as i64;
    i32 => HostKind::Int(32), Int as i64;
    i64 => HostKind::Int(64), Int as i64;
    isize => HostKind::Int(64), Int as i64;
    u8 => HostKind::Uint(8), Uint as u64;
    u16 => HostKind::Uint(16), Uint as u64;
    u32 => HostKind::Uint(32), Uint as u64;
    u64 => HostKind::Uint(64), Uint as u64;
    usize => HostKind::Uint(64), Uint as u64;
    f32 => HostKind::Float(32), Float as f64;
    f64 => HostKind::Float(64), Float as f64;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch::<bool>(other)),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, EvalError> {
                    let converted = match value {
                        Value::Int(i) => <$t>::try_from(*i).ok(),
                        Value::Uint(u) => <$t>::try_from(*u).ok(),
                        other => return Err(mismatch::<$t>(other)),
                    };
                    converted.ok_or_else(|| EvalError::Overflow(stringify!($t).to_string()))
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Double(d) => Ok(*d),
            other => Err(mismatch::<f64>(other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Double(d) => Ok(*d as f32),
            other => Err(mismatch::<f32>(other)),
        }
    }
}

impl Typed for () {
    fn host_type() -> HostType {
        HostType::cached::<()>(|| HostKind::Unit)
    }
}

impl FromValue for () {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Null => Ok(()),
            other => Err(mismatch::<()>(other)),
        }
    }
}

// ============================================================================
// Strings
// ============================================================================

impl Typed for String {
    fn host_type() -> HostType {
        HostType::cached::<String>(|| HostKind::String)
    }
}

impl Reflect for String {
    fn reflect_type(&self) -> HostType {
        <String as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self)
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    reflect_any!();
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::String(s) => Ok(s.to_string()),
            other => Err(mismatch::<String>(other)),
        }
    }
}

impl Typed for &'static str {
    fn host_type() -> HostType {
        HostType::cached::<&'static str>(|| HostKind::String)
    }
}

impl Reflect for &'static str {
    fn reflect_type(&self) -> HostType {
        <&'static str as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self)
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(*self)
    }

    reflect_any!();
}

// ============================================================================
// Lists
// ============================================================================

impl<T: Reflect + Typed> Typed for Vec<T> {
    fn host_type() -> HostType {
        HostType::cached::<Vec<T>>(|| HostKind::List {
            elem: T::host_type(),
            len: None,
        })
    }
}

impl<T: Reflect + Typed + Clone> Reflect for Vec<T> {
    fn reflect_type(&self) -> HostType {
        <Vec<T> as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            return ReflectRef::Bytes(bytes);
        }
        ReflectRef::List(self.iter().map(|v| v as &dyn Reflect).collect())
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    reflect_any!();
}

impl<T: FromValue + 'static> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::Bytes(bytes) if TypeId::of::<T>() == TypeId::of::<u8>() => {
                let raw: Box<dyn Any> = Box::new(bytes.to_vec());
                raw.downcast::<Vec<T>>()
                    .map(|v| *v)
                    .map_err(|_| EvalError::conversion(value.ty(), "Vec<u8>"))
            }
            other => Err(EvalError::conversion(other.ty(), std::any::type_name::<Vec<T>>())),
        }
    }
}

impl<T: Reflect + Typed, const N: usize> Typed for [T; N] {
    fn host_type() -> HostType {
        HostType::cached::<[T; N]>(|| HostKind::List {
            elem: T::host_type(),
            len: Some(N),
        })
    }
}

impl<T: Reflect + Typed + Clone, const N: usize> Reflect for [T; N] {
    fn reflect_type(&self) -> HostType {
        <[T; N] as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        if let Some(bytes) = (self as &dyn Any).downcast_ref::<[u8; N]>() {
            return ReflectRef::Bytes(bytes);
        }
        ReflectRef::List(self.iter().map(|v| v as &dyn Reflect).collect())
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    reflect_any!();
}

impl<T: FromValue + 'static, const N: usize> FromValue for [T; N] {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        let items = Vec::<T>::from_value(value)?;
        let len = items.len();
        items.try_into().map_err(|_| {
            EvalError::conversion(
                format!("list of length {len}"),
                std::any::type_name::<[T; N]>(),
            )
        })
    }
}

// ============================================================================
// Maps
// ============================================================================

macro_rules! impl_map {
    ($map:ident, $($bound:path),+) => {
        impl<K, V> Typed for $map<K, V>
        where
            K: Reflect + Typed $(+ $bound)+,
            V: Reflect + Typed,
        {
            fn host_type() -> HostType {
                HostType::cached::<$map<K, V>>(|| HostKind::Map {
                    key: K::host_type(),
                    value: V::host_type(),
                })
            }
        }

        impl<K, V> Reflect for $map<K, V>
        where
            K: Reflect + Typed + Clone $(+ $bound)+,
            V: Reflect + Typed + Clone,
        {
            fn reflect_type(&self) -> HostType {
                <$map<K, V> as Typed>::host_type()
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Map(
                    self.iter()
                        .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect))
                        .collect(),
                )
            }

            fn clone_reflect(&self) -> Box<dyn Reflect> {
                Box::new(self.clone())
            }

            reflect_any!();
        }

        impl<K, V> FromValue for $map<K, V>
        where
            K: FromValue $(+ $bound)+,
            V: FromValue,
        {
            fn from_value(value: &Value) -> Result<Self, EvalError> {
                match value {
                    Value::Map(map) => map
                        .iter()
                        .map(|(k, v)| Ok((K::from_value(&MapKey::to_value(k))?, V::from_value(v)?)))
                        .collect(),
                    other => Err(EvalError::conversion(
                        other.ty(),
                        std::any::type_name::<$map<K, V>>(),
                    )),
                }
            }
        }
    };
}

impl_map!(HashMap, Eq, Hash);
impl_map!(BTreeMap, Ord);

// ============================================================================
// Pointers
// ============================================================================

fn wrap_box<T: Reflect + Typed + Clone>(inner: Box<dyn Reflect>) -> Option<Box<dyn Reflect>> {
    inner
        .downcast::<T>()
        .ok()
        .map(|v| Box::new(Box::new(v)) as Box<dyn Reflect>)
}

fn wrap_arc<T: Reflect + Typed>(inner: Box<dyn Reflect>) -> Option<Box<dyn Reflect>> {
    inner
        .downcast::<T>()
        .ok()
        .map(|v| Box::new(Arc::new(v)) as Box<dyn Reflect>)
}

fn wrap_some<T: Reflect + Typed + Clone>(inner: Box<dyn Reflect>) -> Option<Box<dyn Reflect>> {
    inner
        .downcast::<T>()
        .ok()
        .map(|v| Box::new(Some(v)) as Box<dyn Reflect>)
}

impl<T: Reflect + Typed + Clone> Typed for Box<T> {
    fn host_type() -> HostType {
        HostType::cached::<Box<T>>(|| HostKind::Pointer {
            elem: T::host_type(),
            wrap: wrap_box::<T>,
        })
    }
}

impl<T: Reflect + Typed + Clone> Reflect for Box<T> {
    fn reflect_type(&self) -> HostType {
        <Box<T> as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(Some(&**self))
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    reflect_any!();
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: Reflect + Typed> Typed for Arc<T> {
    fn host_type() -> HostType {
        HostType::cached::<Arc<T>>(|| HostKind::Pointer {
            elem: T::host_type(),
            wrap: wrap_arc::<T>,
        })
    }
}

impl<T: Reflect + Typed> Reflect for Arc<T> {
    fn reflect_type(&self) -> HostType {
        <Arc<T> as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(Some(&**self))
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(Arc::clone(self))
    }

    reflect_any!();
}

impl<T: FromValue> FromValue for Arc<T> {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        T::from_value(value).map(Arc::new)
    }
}

impl<T: Reflect + Typed + Clone> Typed for Option<T> {
    fn host_type() -> HostType {
        HostType::cached::<Option<T>>(|| HostKind::Optional {
            elem: T::host_type(),
            wrap: wrap_some::<T>,
        })
    }
}

impl<T: Reflect + Typed + Clone> Reflect for Option<T> {
    fn reflect_type(&self) -> HostType {
        <Option<T> as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self.as_ref().map(|v| v as &dyn Reflect))
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    reflect_any!();
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// ============================================================================
// Time
// ============================================================================

macro_rules! impl_datetime {
    ($($tz:ty),*) => {
        $(
            impl Typed for DateTime<$tz> {
                fn host_type() -> HostType {
                    HostType::cached::<DateTime<$tz>>(|| HostKind::Timestamp)
                }
            }

            impl Reflect for DateTime<$tz> {
                fn reflect_type(&self) -> HostType {
                    <DateTime<$tz> as Typed>::host_type()
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Timestamp(self.fixed_offset())
                }

                fn clone_reflect(&self) -> Box<dyn Reflect> {
                    Box::new(*self)
                }

                reflect_any!();
            }
        )*
    };
}

impl_datetime!(Utc, FixedOffset);

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Timestamp(ts) => Ok(*ts),
            other => Err(mismatch::<DateTime<FixedOffset>>(other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Timestamp(ts) => Ok(ts.to_utc()),
            other => Err(mismatch::<DateTime<Utc>>(other)),
        }
    }
}

impl Typed for TimeDelta {
    fn host_type() -> HostType {
        HostType::cached::<TimeDelta>(|| HostKind::Duration)
    }
}

impl Reflect for TimeDelta {
    fn reflect_type(&self) -> HostType {
        <TimeDelta as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Duration(Some(*self))
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(*self)
    }

    reflect_any!();
}

impl FromValue for TimeDelta {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Duration(d) => Ok(*d),
            other => Err(mismatch::<TimeDelta>(other)),
        }
    }
}

impl Typed for std::time::Duration {
    fn host_type() -> HostType {
        HostType::cached::<std::time::Duration>(|| HostKind::Duration)
    }
}

impl Reflect for std::time::Duration {
    fn reflect_type(&self) -> HostType {
        <std::time::Duration as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Duration(TimeDelta::from_std(*self).ok())
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(*self)
    }

    reflect_any!();
}

impl FromValue for std::time::Duration {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Duration(d) => d
                .to_std()
                .map_err(|_| EvalError::Overflow("std::time::Duration".to_string())),
            other => Err(mismatch::<std::time::Duration>(other)),
        }
    }
}

// ============================================================================
// Engine values
// ============================================================================

impl Typed for Value {
    fn host_type() -> HostType {
        HostType::cached::<Value>(|| HostKind::Value)
    }
}

impl Reflect for Value {
    fn reflect_type(&self) -> HostType {
        <Value as Typed>::host_type()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Value(self)
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn type_hint(&self) -> Option<hostbind_types::Type> {
        Some(self.ty())
    }

    reflect_any!();
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, EvalError> {
        Ok(value.clone())
    }
}

// ============================================================================
// Kinds the engine can't represent
// ============================================================================

macro_rules! impl_opaque {
    ($kind:expr; $($t:ty),*) => {
        $(
            impl<T: Send + 'static> Typed for $t {
                fn host_type() -> HostType {
                    HostType::cached::<$t>(|| $kind)
                }
            }

            impl<T: Send + 'static> Reflect for $t {
                fn reflect_type(&self) -> HostType {
                    <$t as Typed>::host_type()
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Opaque
                }

                fn clone_reflect(&self) -> Box<dyn Reflect> {
                    Box::new(self.clone())
                }

                reflect_any!();
            }

            impl<T: Send + 'static> FromValue for $t {
                fn from_value(value: &Value) -> Result<Self, EvalError> {
                    Err(mismatch::<$t>(value))
                }
            }
        )*
    };
}

impl_opaque!(HostKind::Channel; Sender<T>, SyncSender<T>);

macro_rules! impl_fn_pointer {
    ($($arg:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> Typed for fn($($arg),*) -> R {
            fn host_type() -> HostType {
                HostType::cached::<fn($($arg),*) -> R>(|| HostKind::Function)
            }
        }

        impl<R: 'static, $($arg: 'static),*> Reflect for fn($($arg),*) -> R {
            fn reflect_type(&self) -> HostType {
                <fn($($arg),*) -> R as Typed>::host_type()
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Opaque
            }

            fn clone_reflect(&self) -> Box<dyn Reflect> {
                Box::new(*self)
            }

            reflect_any!();
        }

        impl<R: 'static, $($arg: 'static),*> FromValue for fn($($arg),*) -> R {
            fn from_value(value: &Value) -> Result<Self, EvalError> {
                Err(mismatch::<fn($($arg),*) -> R>(value))
            }
        }
    };
}

impl_fn_pointer!();
impl_fn_pointer!(A);
impl_fn_pointer!(A, B);
impl_fn_pointer!(A, B, C);

impl<T: ?Sized + 'static> Typed for *const T {
    fn host_type() -> HostType {
        HostType::cached::<*const T>(|| HostKind::UnsafePointer)
    }
}

impl<T: ?Sized + 'static> Typed for *mut T {
    fn host_type() -> HostType {
        HostType::cached::<*mut T>(|| HostKind::UnsafePointer)
    }
}

impl Typed for Box<dyn std::error::Error + Send + Sync> {
    fn host_type() -> HostType {
        HostType::cached::<Box<dyn std::error::Error + Send + Sync>>(|| HostKind::Error)
    }
}

use super::{MapKey, MapValue, Object};
use crate::evaluator::EvalError;
use crate::reflect::FromValue;
use crate::types::Type;
use chrono::{DateTime, FixedOffset, TimeDelta};
use std::fmt;
use std::sync::Arc;

/// A runtime value of the engine.
///
/// Cloning is cheap: every heap payload is reference counted.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(Arc<str>),
    Bytes(Arc<[u8]>),
    Timestamp(DateTime<FixedOffset>),
    Duration(TimeDelta),
    List(Arc<[Value]>),
    Map(Arc<MapValue>),
    Object(Arc<dyn Object>),
    Type(Type),
    /// Errors are values; they flow through evaluation until observed.
    Error(Arc<EvalError>),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Value {
        Value::String(s.into())
    }

    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Value {
        Value::Bytes(b.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (MapKey, Value)>) -> Value {
        Value::Map(Arc::new(entries.into_iter().collect()))
    }

    pub fn object(obj: impl Object) -> Value {
        Value::Object(Arc::new(obj))
    }

    pub fn error(err: EvalError) -> Value {
        Value::Error(Arc::new(err))
    }

    /// The runtime type of this value.
    ///
    /// Collections report `dyn` element types; their contents are not scanned.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::null(),
            Value::Bool(_) => Type::bool(),
            Value::Int(_) => Type::int(),
            Value::Uint(_) => Type::uint(),
            Value::Double(_) => Type::double(),
            Value::String(_) => Type::string(),
            Value::Bytes(_) => Type::bytes(),
            Value::Timestamp(_) => Type::timestamp(),
            Value::Duration(_) => Type::duration(),
            Value::List(_) => Type::list(Type::dyn_()),
            Value::Map(_) => Type::map(Type::dyn_(), Type::dyn_()),
            Value::Object(obj) => obj.object_type(),
            Value::Type(_) => Type::type_(),
            Value::Error(_) => Type::error(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn as_error(&self) -> Option<&EvalError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Value::Object(obj) => Some(obj.as_ref()),
            _ => None,
        }
    }

    /// Converts into a host value.
    pub fn to_native<T: FromValue>(&self) -> Result<T, EvalError> {
        T::from_value(self)
    }

    /// Engine equality.
    ///
    /// Numbers compare across int, uint and double. Objects decide for
    /// themselves. Errors are never equal to anything.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other| v.equals(other)))
            }
            (Value::Object(a), _) => a.equal(other),
            (_, Value::Object(b)) => b.equal(self),
            (Value::Error(_), _) | (_, Value::Error(_)) => false,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.cmp_number(&y) == Some(std::cmp::Ordering::Equal),
                _ => false,
            },
        }
    }

    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(*i)),
            Value::Uint(u) => Some(Number::Uint(*u)),
            Value::Double(d) => Some(Number::Double(*d)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// A numeric value, used for cross-type comparison.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Number {
    Int(i64),
    Uint(u64),
    Double(f64),
}

impl Number {
    pub(crate) fn cmp_number(&self, other: &Number) -> Option<std::cmp::Ordering> {
        use Number::*;
        match (*self, *other) {
            (Int(a), Int(b)) => Some(a.cmp(&b)),
            (Uint(a), Uint(b)) => Some(a.cmp(&b)),
            (Double(a), Double(b)) => a.partial_cmp(&b),
            (Int(a), Uint(b)) => Some(if a < 0 {
                std::cmp::Ordering::Less
            } else {
                (a as u64).cmp(&b)
            }),
            (Uint(a), Int(b)) => Number::Int(b).cmp_number(&Uint(a)).map(|o| o.reverse()),
            (Int(a), Double(b)) => (a as f64).partial_cmp(&b),
            (Double(a), Int(b)) => a.partial_cmp(&(b as f64)),
            (Uint(a), Double(b)) => (a as f64).partial_cmp(&b),
            (Double(a), Uint(b)) => a.partial_cmp(&(b as f64)),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}u"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            Value::Timestamp(ts) => write!(f, "timestamp({})", ts.to_rfc3339()),
            Value::Duration(d) => write!(f, "duration({d})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.iter()).finish(),
            Value::Object(obj) => write!(f, "{}{{..}}", obj.object_type()),
            Value::Type(t) => write!(f, "type({t})"),
            Value::Error(e) => write!(f, "error({e})"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<EvalError> for Value {
    fn from(e: EvalError) -> Self {
        Value::error(e)
    }
}

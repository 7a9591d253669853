//! Built-in operators on engine values.
//!
//! Each function returns `None` when the operator does not apply to the
//! operand kinds, leaving the caller to report a missing overload.

use super::EvalError;
use crate::syntax::operators::*;
use crate::values::Value;
use std::cmp::Ordering;

pub(crate) fn apply(function: &str, args: &[Value]) -> Option<Value> {
    match (function, args) {
        (EQUALS, [a, b]) => Some(Value::Bool(a.equals(b))),
        (NOT_EQUALS, [a, b]) => Some(Value::Bool(!a.equals(b))),
        (NOT, [Value::Bool(b)]) => Some(Value::Bool(!b)),
        (NEGATE, [v]) => negate(v),
        (ADD, [a, b]) => add(a, b),
        (SUBTRACT, [a, b]) => subtract(a, b),
        (MULTIPLY, [a, b]) => multiply(a, b),
        (DIVIDE, [a, b]) => divide(a, b),
        (MODULO, [a, b]) => modulo(a, b),
        (op, [a, b]) if is_comparison(op) => compare(a, b).map(|ord| {
            Value::Bool(ord.is_some_and(|o| match op {
                LESS => o == Ordering::Less,
                LESS_EQUALS => o != Ordering::Greater,
                GREATER => o == Ordering::Greater,
                _ => o != Ordering::Less,
            }))
        }),
        (INDEX, [a, b]) => index(a, b),
        (IN, [needle, haystack]) => contains(haystack, needle),
        (SIZE, [v]) => size(v),
        _ => None,
    }
}

fn overflow(what: &str) -> Value {
    Value::error(EvalError::Overflow(what.to_string()))
}

fn checked<T>(r: Option<T>, what: &str, wrap: impl FnOnce(T) -> Value) -> Value {
    r.map(wrap).unwrap_or_else(|| overflow(what))
}

fn negate(v: &Value) -> Option<Value> {
    Some(match v {
        Value::Int(i) => checked(i.checked_neg(), "int", Value::Int),
        Value::Double(d) => Value::Double(-d),
        Value::Duration(d) => checked(d.checked_mul(-1), "duration", Value::Duration),
        _ => return None,
    })
}

fn add(a: &Value, b: &Value) -> Option<Value> {
    Some(match (a, b) {
        (Value::Int(x), Value::Int(y)) => checked(x.checked_add(*y), "int", Value::Int),
        (Value::Uint(x), Value::Uint(y)) => checked(x.checked_add(*y), "uint", Value::Uint),
        (Value::Double(x), Value::Double(y)) => Value::Double(x + y),
        (Value::String(x), Value::String(y)) => Value::string(format!("{x}{y}")),
        (Value::Bytes(x), Value::Bytes(y)) => Value::bytes([&x[..], &y[..]].concat()),
        (Value::List(x), Value::List(y)) => Value::list(x.iter().chain(y.iter()).cloned()),
        (Value::Timestamp(t), Value::Duration(d)) | (Value::Duration(d), Value::Timestamp(t)) => {
            checked(t.checked_add_signed(*d), "timestamp", Value::Timestamp)
        }
        (Value::Duration(x), Value::Duration(y)) => {
            checked(x.checked_add(y), "duration", Value::Duration)
        }
        _ => return None,
    })
}

fn subtract(a: &Value, b: &Value) -> Option<Value> {
    Some(match (a, b) {
        (Value::Int(x), Value::Int(y)) => checked(x.checked_sub(*y), "int", Value::Int),
        (Value::Uint(x), Value::Uint(y)) => checked(x.checked_sub(*y), "uint", Value::Uint),
        (Value::Double(x), Value::Double(y)) => Value::Double(x - y),
        (Value::Timestamp(x), Value::Timestamp(y)) => Value::Duration(x.signed_duration_since(*y)),
        (Value::Timestamp(t), Value::Duration(d)) => {
            checked(t.checked_sub_signed(*d), "timestamp", Value::Timestamp)
        }
        (Value::Duration(x), Value::Duration(y)) => {
            checked(x.checked_sub(y), "duration", Value::Duration)
        }
        _ => return None,
    })
}

fn multiply(a: &Value, b: &Value) -> Option<Value> {
    Some(match (a, b) {
        (Value::Int(x), Value::Int(y)) => checked(x.checked_mul(*y), "int", Value::Int),
        (Value::Uint(x), Value::Uint(y)) => checked(x.checked_mul(*y), "uint", Value::Uint),
        (Value::Double(x), Value::Double(y)) => Value::Double(x * y),
        _ => return None,
    })
}

fn divide(a: &Value, b: &Value) -> Option<Value> {
    Some(match (a, b) {
        (Value::Int(_), Value::Int(0)) | (Value::Uint(_), Value::Uint(0)) => {
            Value::error(EvalError::DivisionByZero)
        }
        (Value::Int(x), Value::Int(y)) => checked(x.checked_div(*y), "int", Value::Int),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x / y),
        (Value::Double(x), Value::Double(y)) => Value::Double(x / y),
        _ => return None,
    })
}

fn modulo(a: &Value, b: &Value) -> Option<Value> {
    Some(match (a, b) {
        (Value::Int(_), Value::Int(0)) | (Value::Uint(_), Value::Uint(0)) => {
            Value::error(EvalError::ModulusByZero)
        }
        (Value::Int(x), Value::Int(y)) => checked(x.checked_rem(*y), "int", Value::Int),
        (Value::Uint(x), Value::Uint(y)) => Value::Uint(x % y),
        _ => return None,
    })
}

/// Outer `None`: not comparable. Inner `None`: unordered (NaN).
fn compare(a: &Value, b: &Value) -> Option<Option<Ordering>> {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return Some(x.cmp_number(&y));
    }
    Some(Some(match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::Duration(x), Value::Duration(y)) => x.cmp(y),
        _ => return None,
    }))
}

fn index(operand: &Value, index: &Value) -> Option<Value> {
    match (operand, index) {
        (Value::List(items), Value::Int(i)) => Some(list_index(items, *i)),
        (Value::List(items), Value::Uint(u)) => {
            Some(list_index(items, i64::try_from(*u).unwrap_or(i64::MAX)))
        }
        (Value::Map(map), key) => Some(
            map.lookup(key)
                .cloned()
                .unwrap_or_else(|| Value::error(EvalError::NoSuchKey(format!("{key:?}")))),
        ),
        (Value::Object(obj), key) => obj.as_indexer().map(|ix| ix.get(key)),
        _ => None,
    }
}

fn list_index(items: &[Value], i: i64) -> Value {
    usize::try_from(i)
        .ok()
        .and_then(|idx| items.get(idx))
        .cloned()
        .unwrap_or_else(|| {
            Value::error(EvalError::IndexOutOfBounds {
                index: i,
                len: items.len(),
            })
        })
}

fn contains(haystack: &Value, needle: &Value) -> Option<Value> {
    match haystack {
        Value::List(items) => Some(Value::Bool(items.iter().any(|v| v.equals(needle)))),
        Value::Map(map) => Some(Value::Bool(map.lookup(needle).is_some())),
        _ => None,
    }
}

fn size(v: &Value) -> Option<Value> {
    let n = match v {
        Value::String(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        _ => return None,
    };
    Some(Value::Int(n as i64))
}

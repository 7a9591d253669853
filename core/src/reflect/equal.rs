use super::{HostKind, Reflect, ReflectRef};

/// Structural equality of two host values.
///
/// Values of different host types are never equal. Pointers compare by
/// target, structs field by field (private fields included) and maps
/// irrespective of iteration order. Opaque values are never equal.
pub fn deep_equal(a: &dyn Reflect, b: &dyn Reflect) -> bool {
    let ty = a.reflect_type();
    if ty != b.reflect_type() {
        return false;
    }
    match (a.reflect_ref(), b.reflect_ref()) {
        (ReflectRef::Unit, ReflectRef::Unit) => true,
        (ReflectRef::Bool(x), ReflectRef::Bool(y)) => x == y,
        (ReflectRef::Int(x), ReflectRef::Int(y)) => x == y,
        (ReflectRef::Uint(x), ReflectRef::Uint(y)) => x == y,
        (ReflectRef::Float(x), ReflectRef::Float(y)) => x == y,
        (ReflectRef::String(x), ReflectRef::String(y)) => x == y,
        (ReflectRef::Bytes(x), ReflectRef::Bytes(y)) => x == y,
        (ReflectRef::List(xs), ReflectRef::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(&ys).all(|(x, y)| deep_equal(*x, *y))
        }
        (ReflectRef::Map(xs), ReflectRef::Map(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(xk, xv)| {
                    ys.iter()
                        .find(|(yk, _)| deep_equal(*xk, *yk))
                        .is_some_and(|(_, yv)| deep_equal(*xv, *yv))
                })
        }
        (ReflectRef::Pointer(x), ReflectRef::Pointer(y)) => match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => deep_equal(x, y),
            _ => false,
        },
        (ReflectRef::Struct, ReflectRef::Struct) => match ty.kind() {
            HostKind::Struct(info) => info
                .fields
                .iter()
                .all(|field| match ((field.get)(a), (field.get)(b)) {
                    (Some(x), Some(y)) => deep_equal(x, y),
                    _ => false,
                }),
            _ => false,
        },
        (ReflectRef::Timestamp(x), ReflectRef::Timestamp(y)) => x == y,
        (ReflectRef::Duration(None), ReflectRef::Duration(None)) => {
            a.downcast_ref::<std::time::Duration>() == b.downcast_ref::<std::time::Duration>()
        }
        (ReflectRef::Duration(x), ReflectRef::Duration(y)) => x == y,
        (ReflectRef::Value(x), ReflectRef::Value(y)) => x == y,
        _ => false,
    }
}

/// True if the value equals its type's zero value.
///
/// Empty strings, collections and nil pointers are zero; `Box`/`Arc` never
/// are. The zero instant is the Unix epoch.
pub fn is_zero(value: &dyn Reflect) -> bool {
    match value.reflect_ref() {
        ReflectRef::Unit => true,
        ReflectRef::Bool(b) => !b,
        ReflectRef::Int(i) => i == 0,
        ReflectRef::Uint(u) => u == 0,
        ReflectRef::Float(f) => f == 0.0,
        ReflectRef::String(s) => s.is_empty(),
        ReflectRef::Bytes(b) => match value.reflect_type().kind() {
            HostKind::List { len: Some(_), .. } => b.iter().all(|x| *x == 0),
            _ => b.is_empty(),
        },
        ReflectRef::List(items) => match value.reflect_type().kind() {
            HostKind::List { len: Some(_), .. } => items.iter().all(|v| is_zero(*v)),
            _ => items.is_empty(),
        },
        ReflectRef::Map(entries) => entries.is_empty(),
        ReflectRef::Pointer(target) => match value.reflect_type().kind() {
            HostKind::Optional { .. } => target.is_none(),
            _ => false,
        },
        ReflectRef::Struct => match value.reflect_type().kind() {
            HostKind::Struct(info) => info
                .fields
                .iter()
                .all(|field| (field.get)(value).is_none_or(is_zero)),
            _ => false,
        },
        ReflectRef::Timestamp(ts) => ts.timestamp() == 0 && ts.timestamp_subsec_nanos() == 0,
        ReflectRef::Duration(d) => d == Some(chrono::TimeDelta::zero()),
        ReflectRef::Value(v) => v.is_null(),
        ReflectRef::Opaque => false,
    }
}

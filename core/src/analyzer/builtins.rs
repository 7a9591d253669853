//! Result types of the built-in operators.

use crate::syntax::operators::*;
use crate::types::{Scalar, Traits, Type, TypeKind};

/// Result type of a built-in operator applied to `args`, if one applies.
pub(crate) fn result_type(function: &str, args: &[Type], member: bool) -> Option<Type> {
    if member && function != SIZE {
        return None;
    }
    if args.iter().any(Type::is_dyn) {
        return dyn_result(function, args.len());
    }
    let scalars: Vec<Option<Scalar>> = args.iter().map(Type::as_scalar).collect();
    use Scalar::*;
    match (function, scalars.as_slice()) {
        (NOT, [Some(Bool)]) => Some(Type::bool()),
        (NEGATE, [Some(s @ (Int | Double))]) => Some(Type::scalar(*s)),
        (ADD, [Some(a), Some(b)]) => match (a, b) {
            (Int, Int) | (Uint, Uint) | (Double, Double) | (String, String) | (Bytes, Bytes) => {
                Some(Type::scalar(*a))
            }
            (Timestamp, Duration) | (Duration, Timestamp) => Some(Type::timestamp()),
            (Duration, Duration) => Some(Type::duration()),
            _ => None,
        },
        (ADD, [None, None]) => match (args[0].kind(), args[1].kind()) {
            (TypeKind::List(a), TypeKind::List(b)) => {
                Some(Type::list(if a == b { a.clone() } else { Type::dyn_() }))
            }
            _ => None,
        },
        (SUBTRACT, [Some(a), Some(b)]) => match (a, b) {
            (Int, Int) | (Uint, Uint) | (Double, Double) => Some(Type::scalar(*a)),
            (Timestamp, Timestamp) | (Duration, Duration) => Some(Type::duration()),
            (Timestamp, Duration) => Some(Type::timestamp()),
            _ => None,
        },
        (MULTIPLY | DIVIDE, [Some(a), Some(b)]) if a == b && a.is_numeric() => {
            Some(Type::scalar(*a))
        }
        (MODULO, [Some(a @ (Int | Uint)), Some(b)]) if a == b => Some(Type::scalar(*a)),
        (f, [Some(a), Some(b)]) if is_comparison(f) => {
            let comparable = (a == b && a.is_comparable()) || (a.is_numeric() && b.is_numeric());
            comparable.then(Type::bool)
        }
        (INDEX, [_, _]) => index_type(&args[0], &args[1]),
        (IN, [_, _]) => match args[1].kind() {
            TypeKind::List(elem) if elem.is_assignable_from(&args[0]) => Some(Type::bool()),
            TypeKind::Map(key, _) if key.is_assignable_from(&args[0]) => Some(Type::bool()),
            _ => None,
        },
        (SIZE, [_]) => match args[0].kind() {
            TypeKind::Scalar(String | Bytes) | TypeKind::List(_) | TypeKind::Map(_, _) => {
                Some(Type::int())
            }
            _ => None,
        },
        _ => None,
    }
}

fn index_type(operand: &Type, index: &Type) -> Option<Type> {
    match operand.kind() {
        TypeKind::List(elem) => matches!(index.as_scalar(), Some(Scalar::Int | Scalar::Uint))
            .then(|| elem.clone()),
        TypeKind::Map(key, value) => key.is_assignable_from(index).then(|| value.clone()),
        TypeKind::Object(obj) if obj.traits.contains(Traits::INDEXER) => Some(Type::dyn_()),
        _ => None,
    }
}

fn dyn_result(function: &str, arity: usize) -> Option<Type> {
    match (function, arity) {
        (NOT, 1) => Some(Type::bool()),
        (NEGATE, 1) => Some(Type::dyn_()),
        (SIZE, 1) => Some(Type::int()),
        (IN, 2) => Some(Type::bool()),
        (f, 2) if is_comparison(f) => Some(Type::bool()),
        (f, 2) if is_arithmetic(f) || f == INDEX => Some(Type::dyn_()),
        _ => None,
    }
}

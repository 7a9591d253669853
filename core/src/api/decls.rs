//! Declarations a library hands to the engine.

use crate::evaluator::EvalError;
use crate::types::Type;
use crate::values::Value;
use std::fmt;
use std::sync::Arc;

/// Runtime implementation of an overload.
///
/// The variants mirror the arities the evaluator calls most often; anything
/// with three or more arguments goes through [`Binding::Variadic`].
#[derive(Clone)]
pub enum Binding {
    Nullary(Arc<dyn Fn() -> Value + Send + Sync>),
    Unary(Arc<dyn Fn(&Value) -> Value + Send + Sync>),
    Binary(Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>),
    Variadic(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>),
}

impl Binding {
    /// Calls the binding. Member overloads receive the target first.
    pub fn invoke(&self, args: &[Value]) -> Value {
        match (self, args) {
            (Binding::Nullary(f), []) => f(),
            (Binding::Unary(f), [a]) => f(a),
            (Binding::Binary(f), [a, b]) => f(a, b),
            (Binding::Variadic(f), args) => f(args),
            (_, args) => Value::error(EvalError::Native(format!(
                "binding called with {} argument(s)",
                args.len()
            ))),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Binding::Nullary(_) => "Binding::Nullary",
            Binding::Unary(_) => "Binding::Unary",
            Binding::Binary(_) => "Binding::Binary",
            Binding::Variadic(_) => "Binding::Variadic",
        })
    }
}

/// One signature of a function.
#[derive(Debug, Clone)]
pub struct OverloadDecl {
    /// Unique identity of the signature, see [`overload_id`].
    pub id: String,
    pub params: Vec<Type>,
    pub result: Type,
    /// Called as `target.name(args)`; the target is `params[0]`.
    pub member: bool,
    pub binding: Binding,
}

impl OverloadDecl {
    pub fn new(name: &str, params: Vec<Type>, result: Type, member: bool, binding: Binding) -> Self {
        OverloadDecl {
            id: overload_id(name, &params, &result, member),
            params,
            result,
            member,
            binding,
        }
    }

    /// True if the runtime arguments fit the declared parameters.
    pub fn accepts(&self, args: &[Value]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(ty, arg)| value_matches(ty, arg))
    }
}

/// `name|@|p1,p2|result` for global overloads, `name|member@|...` for members.
pub fn overload_id(name: &str, params: &[Type], result: &Type, member: bool) -> String {
    let params = params
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(",");
    let marker = if member { "member@" } else { "@" };
    format!("{name}|{marker}|{params}|{result}")
}

/// Runtime check of a value against a declared type.
///
/// Collections are matched by kind only; their elements are not scanned.
pub fn value_matches(ty: &Type, value: &Value) -> bool {
    use crate::types::{Scalar, TypeKind};
    match (ty.kind(), value) {
        (TypeKind::Dyn, _) => true,
        (TypeKind::Nullable(_), Value::Null) => true,
        (TypeKind::Nullable(inner), v) => value_matches(inner, v),
        (TypeKind::Scalar(s), v) => matches!(
            (s, v),
            (Scalar::Null, Value::Null)
                | (Scalar::Bool, Value::Bool(_))
                | (Scalar::Int, Value::Int(_))
                | (Scalar::Uint, Value::Uint(_))
                | (Scalar::Double, Value::Double(_))
                | (Scalar::String, Value::String(_))
                | (Scalar::Bytes, Value::Bytes(_))
                | (Scalar::Timestamp, Value::Timestamp(_))
                | (Scalar::Duration, Value::Duration(_))
        ),
        (TypeKind::List(_), Value::List(_)) => true,
        (TypeKind::Map(_, _), Value::Map(_)) => true,
        (TypeKind::Object(obj), Value::Object(v)) => v
            .object_type()
            .as_object()
            .is_some_and(|actual| actual.name == obj.name),
        (TypeKind::Type, Value::Type(_)) => true,
        (TypeKind::Error, Value::Error(_)) => true,
        _ => false,
    }
}

/// All overloads of one function name.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub overloads: Vec<OverloadDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub ty: Type,
}

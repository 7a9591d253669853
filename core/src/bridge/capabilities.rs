//! Operator overloads for objects with capabilities.
//!
//! An object advertises an operator capability by returning `Some` from the
//! matching [`Object`] query *and* carrying the trait bit on its type. The
//! detected set is cached per concrete object type, and every capability
//! becomes one or more overloads dispatching to the object.

use crate::api::{Binding, OverloadDecl};
use crate::evaluator::EvalError;
use crate::syntax::operators::*;
use crate::types::{Traits, Type};
use crate::values::{Object, Value};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::any::TypeId;
use std::sync::Arc;

/// Capabilities implemented per concrete object type.
///
/// Only the `as_*` probe results are cached. The declared traits of the
/// object's engine type are applied on every call, so two objects of one
/// Rust type may expose different capabilities.
#[derive(Default)]
pub struct CapabilityCache {
    cache: RwLock<HashMap<TypeId, Traits>>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detect(&self, obj: &dyn Object) -> Traits {
        self.implemented(obj) & obj.object_type().traits()
    }

    fn implemented(&self, obj: &dyn Object) -> Traits {
        let id = obj.as_any().type_id();
        if let Some(found) = self.cache.read().get(&id) {
            return *found;
        }
        let found = probe(obj);
        *self.cache.write().entry(id).or_insert(found)
    }
}

fn probe(obj: &dyn Object) -> Traits {
    let probes: [(Traits, bool); 10] = [
        (Traits::ADDER, obj.as_adder().is_some()),
        (Traits::SUBTRACTOR, obj.as_subtractor().is_some()),
        (Traits::NEGATER, obj.as_negater().is_some()),
        (Traits::MULTIPLIER, obj.as_multiplier().is_some()),
        (Traits::DIVIDER, obj.as_divider().is_some()),
        (Traits::MODDER, obj.as_modder().is_some()),
        (Traits::COMPARER, obj.as_comparer().is_some()),
        (Traits::INDEXER, obj.as_indexer().is_some()),
        (Traits::SIZER, obj.as_sizer().is_some()),
        (Traits::CONTAINER, obj.as_container().is_some()),
    ];
    probes
        .into_iter()
        .filter(|(_, implemented)| *implemented)
        .fold(Traits::empty(), |acc, (t, _)| acc | t)
}

/// Overloads wiring `caps` of objects of type `ty`, as `(function, overload)`.
pub fn capability_overloads(ty: &Type, caps: Traits) -> Vec<(&'static str, OverloadDecl)> {
    let mut out = Vec::new();
    let this = ty.clone();
    let dyn_ = Type::dyn_;
    let mut binary = |name: &'static str, result: Type, f: fn(&dyn Object, &Value) -> Option<Value>| {
        let binding = Binding::Binary(Arc::new(move |a: &Value, b: &Value| {
            on_object(name, a, &[a, b], |obj| f(obj, b))
        }));
        out.push((name, OverloadDecl::new(name, vec![this.clone(), dyn_()], result, false, binding)));
    };

    if caps.contains(Traits::ADDER) {
        binary(ADD, ty.clone(), |o, v| o.as_adder().map(|c| c.add(v)));
    }
    if caps.contains(Traits::SUBTRACTOR) {
        binary(SUBTRACT, ty.clone(), |o, v| o.as_subtractor().map(|c| c.subtract(v)));
    }
    if caps.contains(Traits::MULTIPLIER) {
        binary(MULTIPLY, ty.clone(), |o, v| o.as_multiplier().map(|c| c.multiply(v)));
    }
    if caps.contains(Traits::DIVIDER) {
        binary(DIVIDE, ty.clone(), |o, v| o.as_divider().map(|c| c.divide(v)));
    }
    if caps.contains(Traits::MODDER) {
        binary(MODULO, ty.clone(), |o, v| o.as_modder().map(|c| c.modulo(v)));
    }
    if caps.contains(Traits::COMPARER) {
        binary(LESS, Type::int(), |o, v| compare(o, v, |c| c < 0));
        binary(LESS_EQUALS, Type::int(), |o, v| compare(o, v, |c| c <= 0));
        binary(GREATER, Type::int(), |o, v| compare(o, v, |c| c > 0));
        binary(GREATER_EQUALS, Type::int(), |o, v| compare(o, v, |c| c >= 0));
    }
    if caps.contains(Traits::INDEXER) {
        binary(INDEX, Type::dyn_(), |o, v| o.as_indexer().map(|c| c.get(v)));
    }

    if caps.contains(Traits::NEGATER) {
        let binding = Binding::Unary(Arc::new(|a: &Value| {
            on_object(NEGATE, a, &[a], |o| o.as_negater().map(|c| c.negate()))
        }));
        out.push((NEGATE, OverloadDecl::new(NEGATE, vec![ty.clone()], ty.clone(), false, binding)));
    }
    if caps.contains(Traits::SIZER) {
        let binding = Binding::Unary(Arc::new(|a: &Value| {
            on_object(SIZE, a, &[a], |o| o.as_sizer().map(|c| c.size()))
        }));
        out.push((SIZE, OverloadDecl::new(SIZE, vec![ty.clone()], Type::int(), false, binding)));
    }
    if caps.contains(Traits::CONTAINER) {
        let binding = Binding::Binary(Arc::new(|needle: &Value, haystack: &Value| {
            on_object(IN, haystack, &[needle, haystack], |o| {
                o.as_container().map(|c| c.contains(needle))
            })
        }));
        out.push((
            IN,
            OverloadDecl::new(IN, vec![Type::dyn_(), ty.clone()], Type::bool(), false, binding),
        ));
    }
    out
}

/// Runs `f` on the object in `subject`, or reports a missing overload.
fn on_object(
    function: &str,
    subject: &Value,
    args: &[&Value],
    f: impl FnOnce(&dyn Object) -> Option<Value>,
) -> Value {
    subject
        .as_object()
        .and_then(f)
        .unwrap_or_else(|| {
            let args: Vec<Value> = args.iter().map(|v| (*v).clone()).collect();
            Value::error(EvalError::no_such_overload(function, &args))
        })
}

/// Boolean outcome of a three-way comparison.
fn compare(obj: &dyn Object, other: &Value, accept: fn(i64) -> bool) -> Option<Value> {
    let result = obj.as_comparer()?.compare(other);
    Some(match result {
        Value::Int(c) => Value::Bool(accept(c)),
        other => other,
    })
}

use super::*;
use crate::evaluator::EvalError;
use crate::syntax::operators::{ADD, GREATER, IN, LESS, NEGATE, SIZE};
use crate::types::{Traits, Type};
use crate::values::{Adder, Comparer, Container, Negater, Object, Sizer, Value};
use std::any::Any;

/// Cents, advertising the given traits on its type.
struct Money(i64, Traits);

fn money_type(traits: Traits) -> Type {
    Type::object("test.Money", traits)
}

fn cents(v: &Value) -> Option<i64> {
    v.as_object()
        .and_then(|o| o.as_any().downcast_ref::<Money>())
        .map(|m| m.0)
}

impl Object for Money {
    fn object_type(&self) -> Type {
        money_type(self.1)
    }

    fn equal(&self, other: &Value) -> bool {
        cents(other) == Some(self.0)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_adder(&self) -> Option<&dyn Adder> {
        Some(self)
    }

    fn as_negater(&self) -> Option<&dyn Negater> {
        Some(self)
    }

    fn as_comparer(&self) -> Option<&dyn Comparer> {
        Some(self)
    }

    fn as_sizer(&self) -> Option<&dyn Sizer> {
        Some(self)
    }

    fn as_container(&self) -> Option<&dyn Container> {
        Some(self)
    }
}

impl Adder for Money {
    fn add(&self, other: &Value) -> Value {
        match cents(other) {
            Some(c) => Value::object(Money(self.0 + c, self.1)),
            None => Value::error(EvalError::no_such_overload(ADD, &[other.clone()])),
        }
    }
}

impl Negater for Money {
    fn negate(&self) -> Value {
        Value::object(Money(-self.0, self.1))
    }
}

impl Comparer for Money {
    fn compare(&self, other: &Value) -> Value {
        match cents(other) {
            Some(c) => Value::Int(self.0.cmp(&c) as i64),
            None => Value::error(EvalError::no_such_overload(LESS, &[other.clone()])),
        }
    }
}

impl Sizer for Money {
    fn size(&self) -> Value {
        Value::Int(self.0.abs().to_string().len() as i64)
    }
}

impl Container for Money {
    fn contains(&self, value: &Value) -> Value {
        Value::Bool(value.as_int().is_some_and(|c| c <= self.0))
    }
}

const ALL: Traits = Traits::ADDER
    .union(Traits::NEGATER)
    .union(Traits::COMPARER)
    .union(Traits::SIZER)
    .union(Traits::CONTAINER);

fn overload<'a>(
    overloads: &'a [(&'static str, crate::api::OverloadDecl)],
    name: &str,
) -> &'a crate::api::OverloadDecl {
    &overloads
        .iter()
        .find(|(n, _)| *n == name)
        .unwrap_or_else(|| panic!("no overload for {name}"))
        .1
}

#[test]
fn test_detect_requires_declared_trait() {
    let cache = CapabilityCache::new();
    let caps = cache.detect(&Money(1, Traits::ADDER | Traits::SIZER));
    assert_eq!(caps, Traits::ADDER | Traits::SIZER);
}

#[test]
fn test_declared_traits_gate_every_detection() {
    let cache = CapabilityCache::new();
    assert_eq!(cache.detect(&Money(1, ALL)), ALL);

    let bare = Money(1, Traits::empty());
    let caps = cache.detect(&bare);
    assert_eq!(caps, Traits::empty());
    assert!(capability_overloads(&money_type(Traits::empty()), caps).is_empty());

    assert_eq!(cache.detect(&Money(1, Traits::COMPARER)), Traits::COMPARER);
    assert_eq!(cache.detect(&Money(1, ALL)), ALL);
}

#[test]
fn test_overloads_per_capability() {
    let ty = money_type(ALL);
    let overloads = capability_overloads(&ty, ALL);
    let names: Vec<&str> = overloads.iter().map(|(n, _)| *n).collect();
    assert_eq!(
        names,
        vec![ADD, LESS, "_<=_", GREATER, "_>=_", NEGATE, SIZE, IN]
    );
    assert_eq!(overload(&overloads, ADD).params, vec![ty.clone(), Type::dyn_()]);
    assert_eq!(overload(&overloads, ADD).result, ty);
    assert_eq!(overload(&overloads, LESS).result, Type::int());
    assert_eq!(overload(&overloads, SIZE).result, Type::int());
    assert_eq!(overload(&overloads, IN).params, vec![Type::dyn_(), ty]);
}

#[test]
fn test_bindings_dispatch_to_object() {
    let ty = money_type(ALL);
    let overloads = capability_overloads(&ty, ALL);
    let a = Value::object(Money(150, ALL));
    let b = Value::object(Money(50, ALL));

    let sum = overload(&overloads, ADD).binding.invoke(&[a.clone(), b.clone()]);
    assert_eq!(cents(&sum), Some(200));

    let neg = overload(&overloads, NEGATE).binding.invoke(&[a.clone()]);
    assert_eq!(cents(&neg), Some(-150));

    assert_eq!(
        overload(&overloads, LESS).binding.invoke(&[a.clone(), b.clone()]),
        Value::Bool(false)
    );
    assert_eq!(
        overload(&overloads, GREATER).binding.invoke(&[a.clone(), b]),
        Value::Bool(true)
    );
    assert_eq!(
        overload(&overloads, SIZE).binding.invoke(&[a.clone()]),
        Value::Int(3)
    );
    assert_eq!(
        overload(&overloads, IN).binding.invoke(&[Value::Int(100), a]),
        Value::Bool(true)
    );
}

#[test]
fn test_comparison_errors_propagate() {
    let ty = money_type(ALL);
    let overloads = capability_overloads(&ty, ALL);
    let a = Value::object(Money(1, ALL));
    let result = overload(&overloads, LESS)
        .binding
        .invoke(&[a, Value::string("x")]);
    assert!(result.is_error());
}

#[test]
fn test_non_objects_report_missing_overload() {
    let ty = money_type(ALL);
    let overloads = capability_overloads(&ty, ALL);
    let result = overload(&overloads, NEGATE).binding.invoke(&[Value::Int(1)]);
    assert!(matches!(
        result.as_error(),
        Some(EvalError::NoSuchOverload { function, .. }) if function == NEGATE
    ));
}

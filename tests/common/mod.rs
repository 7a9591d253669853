//! Shared host types for the integration tests.

#![allow(dead_code)]

use hostbind::{
    Adder, Comparer, Container, EvalError, Native, Negater, Object, Sizer, Traits, Type, Value,
};
use std::any::Any;

#[derive(Clone, Debug, Default, PartialEq, Native)]
#[native(default)]
pub struct Point {
    #[native(json = "x")]
    pub x: i64,
    #[native(json = "y")]
    pub y: i64,
}

#[derive(Clone, Debug, PartialEq, Native)]
pub struct Shipment {
    #[native(json = "id,omitempty")]
    pub id: String,
    #[native(json = "-")]
    pub secret: String,
    pub weight: f64,
    #[native(json = "stops")]
    pub stops: Vec<Point>,
    #[native(json = "origin")]
    pub origin: Option<Box<Point>>,
    #[native(json = "dest")]
    pub dest: Point,
    internal: u8,
}

impl Shipment {
    pub fn new(id: &str, stops: Vec<Point>) -> Self {
        Shipment {
            id: id.to_string(),
            secret: "hunter2".to_string(),
            weight: 1.5,
            stops,
            origin: None,
            dest: Point { x: 9, y: 9 },
            internal: 0,
        }
    }
}

/// An amount in cents with arithmetic and comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Money(pub i64);

pub fn money_type() -> Type {
    Type::object("shop.Money", Traits::all())
}

fn cents(v: &Value) -> Option<i64> {
    v.as_object()
        .and_then(|o| o.as_any().downcast_ref::<Money>())
        .map(|m| m.0)
}

impl Object for Money {
    fn object_type(&self) -> Type {
        money_type()
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
            Some(c) => Value::object(Money(self.0 + c)),
            None => Value::error(EvalError::Native(format!("cannot add {}", other.ty()))),
        }
    }
}

impl Negater for Money {
    fn negate(&self) -> Value {
        Value::object(Money(-self.0))
    }
}

impl Comparer for Money {
    fn compare(&self, other: &Value) -> Value {
        match cents(other) {
            Some(c) => Value::Int(self.0.cmp(&c) as i64),
            None => Value::error(EvalError::Native(format!("cannot compare {}", other.ty()))),
        }
    }
}

impl Sizer for Money {
    /// Number of whole units.
    fn size(&self) -> Value {
        Value::Int(self.0 / 100)
    }
}

impl Container for Money {
    /// Whether an integer amount of cents fits in this one.
    fn contains(&self, value: &Value) -> Value {
        Value::Bool(value.as_int().is_some_and(|c| c <= self.0))
    }
}

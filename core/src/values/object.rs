//! Objects: values whose behavior is supplied by the host.
//!
//! An [`Object`] exposes field access and equality. Operator support is
//! opted into through the capability traits below; an object advertises
//! each one by returning `Some(self)` from the matching `as_*` query.

use super::Value;
use crate::evaluator::EvalError;
use crate::reflect::{HostType, Reflect};
use crate::types::Type;
use std::any::Any;

pub trait Object: Send + Sync + 'static {
    fn object_type(&self) -> Type;

    fn equal(&self, other: &Value) -> bool;

    /// Value of a field, or an error value if there is no such field.
    fn get_field(&self, name: &str) -> Value {
        Value::error(EvalError::NoSuchField(name.to_string()))
    }

    /// Whether a field is set. Returns a bool or an error value.
    fn has_field(&self, name: &str) -> Value {
        Value::error(EvalError::NoSuchField(name.to_string()))
    }

    /// The host value behind this object, if any.
    fn native(&self) -> Option<&dyn Reflect> {
        None
    }

    fn convert_to_native(&self, target: &HostType) -> Result<Box<dyn Reflect>, EvalError> {
        Err(EvalError::conversion(self.object_type(), target.name()))
    }

    fn as_any(&self) -> &dyn Any;

    fn as_adder(&self) -> Option<&dyn Adder> {
        None
    }

    fn as_subtractor(&self) -> Option<&dyn Subtractor> {
        None
    }

    fn as_negater(&self) -> Option<&dyn Negater> {
        None
    }

    fn as_multiplier(&self) -> Option<&dyn Multiplier> {
        None
    }

    fn as_divider(&self) -> Option<&dyn Divider> {
        None
    }

    fn as_modder(&self) -> Option<&dyn Modder> {
        None
    }

    fn as_comparer(&self) -> Option<&dyn Comparer> {
        None
    }

    fn as_indexer(&self) -> Option<&dyn Indexer> {
        None
    }

    fn as_sizer(&self) -> Option<&dyn Sizer> {
        None
    }

    fn as_container(&self) -> Option<&dyn Container> {
        None
    }
}

// ============================================================================
// Capabilities
// ============================================================================

pub trait Adder {
    fn add(&self, other: &Value) -> Value;
}

pub trait Subtractor {
    fn subtract(&self, other: &Value) -> Value;
}

pub trait Negater {
    fn negate(&self) -> Value;
}

pub trait Multiplier {
    fn multiply(&self, other: &Value) -> Value;
}

pub trait Divider {
    fn divide(&self, other: &Value) -> Value;
}

pub trait Modder {
    fn modulo(&self, other: &Value) -> Value;
}

/// Three-way comparison. Returns `Int(-1 | 0 | 1)` or an error value.
pub trait Comparer {
    fn compare(&self, other: &Value) -> Value;
}

pub trait Indexer {
    fn get(&self, index: &Value) -> Value;
}

pub trait Sizer {
    fn size(&self) -> Value;
}

pub trait Container {
    fn contains(&self, value: &Value) -> Value;
}

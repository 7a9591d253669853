//! Function names of the built-in operators.
//!
//! Operators are ordinary calls under these names, so libraries can declare
//! overloads for them like any other function.

pub const ADD: &str = "_+_";
pub const SUBTRACT: &str = "_-_";
pub const MULTIPLY: &str = "_*_";
pub const DIVIDE: &str = "_/_";
pub const MODULO: &str = "_%_";
pub const NEGATE: &str = "-_";
pub const NOT: &str = "!_";
pub const EQUALS: &str = "_==_";
pub const NOT_EQUALS: &str = "_!=_";
pub const LESS: &str = "_<_";
pub const LESS_EQUALS: &str = "_<=_";
pub const GREATER: &str = "_>_";
pub const GREATER_EQUALS: &str = "_>=_";
pub const LOGICAL_AND: &str = "_&&_";
pub const LOGICAL_OR: &str = "_||_";
pub const CONDITIONAL: &str = "_?_:_";
pub const INDEX: &str = "_[_]";
pub const IN: &str = "@in";
pub const SIZE: &str = "size";

pub fn is_comparison(name: &str) -> bool {
    matches!(name, LESS | LESS_EQUALS | GREATER | GREATER_EQUALS)
}

pub fn is_arithmetic(name: &str) -> bool {
    matches!(name, ADD | SUBTRACT | MULTIPLY | DIVIDE | MODULO)
}

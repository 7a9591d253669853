//! Tree-walking evaluator.
//!
//! ## Design Principles
//!
//! - **Never panic**: failures become [`Value::Error`](crate::values::Value) values
//! - **Stack-safe**: depth tracking bounds recursion on deeply nested trees
//! - **Library first**: declared overloads are tried before built-in operators,
//!   so a library may take over an operator for its own types
//!
//! Evaluation is driven through [`Program::eval`](crate::api::Program::eval).

mod error;
pub(crate) mod eval;
mod operators;


pub use error::EvalError;

//! Expression trees.

mod expr;
pub mod operators;

pub use expr::Expr;

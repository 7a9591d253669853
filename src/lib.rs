//! hostbind - expose host Rust values and functions to expressions
//!
//! # Overview
//!
//! hostbind bridges native data into an embedded expression engine without
//! per-type conversion code. Structs deriving [`Native`] become engine
//! objects whose fields are selectable under a naming convention, closures
//! become typed overloads, and objects with operator capabilities get their
//! operators wired automatically.
//!
//! # Quick Start
//!
//! ```
//! use hostbind::{Env, Expr, Native, Registry, RegistryOptions, Value, native};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Native)]
//! pub struct Point {
//!     #[native(json = "x")]
//!     pub x: i64,
//!     #[native(json = "y")]
//!     pub y: i64,
//! }
//!
//! let mut registry = Registry::new(RegistryOptions::default().with_tag_name("json"));
//! registry.register("p", Point { x: 2, y: 3 }).unwrap();
//! registry
//!     .register("concat", native(|a: String, b: String| a + &b))
//!     .unwrap();
//! let registry = Arc::new(registry);
//!
//! let env = Env::new(registry.compile_options());
//! let sum = Expr::add(Expr::ident("p").field("x"), Expr::ident("p").field("y"));
//! assert_eq!(env.compile(&sum).unwrap().eval_empty(), Ok(Value::Int(5)));
//!
//! let call = Expr::call("concat", vec![Expr::string("foo"), Expr::string("bar")]);
//! assert_eq!(
//!     env.compile(&call).unwrap().eval_empty(),
//!     Ok(Value::string("foobar"))
//! );
//! ```
//!
//! # Errors
//!
//! Registration, checking and evaluation each have their own error type.
//! [`Error`] unifies them and [`render_error_to_string`] formats any of them
//! as a miette report.

mod render;

pub use hostbind_core::Native;
pub use hostbind_core::api::{
    Activation, EmptyActivation, Env, EnvOptions, ExecutionOptions, HierarchicalActivation,
    MapActivation, Program, TypeAdapter, TypeProvider,
};
pub use hostbind_core::bridge::{
    NativeFunction, NativeObject, RegistrationError, Registry, RegistryOptions, native,
};
pub use hostbind_core::reflect::{FromValue, HostKind, HostType, Reflect, Typed};
pub use hostbind_core::syntax::Expr;
pub use hostbind_core::types::{self, Traits, Type};
pub use hostbind_core::values::{
    self, Adder, Comparer, Container, Divider, Indexer, Modder, Multiplier, Negater, Object,
    Sizer, Subtractor, Value,
};

pub use hostbind_core::analyzer::CheckError;
pub use hostbind_core::evaluator::EvalError;

pub use render::{Error, render_error, render_error_to_string, render_error_to_string_no_color};

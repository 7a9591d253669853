//! Public API of the expression engine.
//!
//! A library describes its functions, variables and types with the
//! declarations in [`decls`], plugs its conversions in through the traits in
//! [`plugin`], and hands both to [`Env::new`]. Expressions are checked with
//! [`Env::compile`] and run with [`Program::eval`].

pub mod activation;
pub mod decls;
pub mod env;
pub mod options;
pub mod plugin;

pub use activation::{EmptyActivation, HierarchicalActivation, MapActivation};
pub use decls::{
    Binding, FunctionDecl, OverloadDecl, VariableDecl, overload_id, value_matches,
};
pub(crate) use env::EnvInner;
pub use env::{Env, Program};
pub use options::{EnvOptions, ExecutionOptions};
pub use plugin::{Activation, BuiltinAdapter, BuiltinProvider, TypeAdapter, TypeProvider};

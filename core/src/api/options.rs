//! Configuration for environments and evaluation.

use super::{Activation, FunctionDecl, TypeAdapter, TypeProvider, VariableDecl};
use crate::types::Type;
use std::sync::Arc;

/// Configuration options for expression execution.
///
/// # Example
///
/// ```
/// use hostbind_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions { max_depth: 500 };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum evaluation depth (for recursion protection).
    ///
    /// Default: 1000
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

/// Everything a library contributes to an environment.
///
/// Declarations are listed in a deterministic order. Unset plugins fall back
/// to the engine builtins.
#[derive(Default, Clone)]
pub struct EnvOptions {
    pub types: Vec<Type>,
    pub functions: Vec<FunctionDecl>,
    pub variables: Vec<VariableDecl>,
    pub provider: Option<Arc<dyn TypeProvider>>,
    pub adapter: Option<Arc<dyn TypeAdapter>>,
    /// Values visible to every evaluation, below the per-call activation.
    pub globals: Option<Arc<dyn Activation + Send + Sync>>,
    pub execution: ExecutionOptions,
}

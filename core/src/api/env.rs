//! Compilation environment and checked programs.

use super::{
    Activation, BuiltinAdapter, BuiltinProvider, EmptyActivation, EnvOptions, ExecutionOptions,
    HierarchicalActivation, MapActivation, OverloadDecl, TypeAdapter, TypeProvider,
};
use crate::analyzer::{self, CheckError};
use crate::evaluator::EvalError;
use crate::evaluator::eval::Evaluator;
use crate::reflect::Reflect;
use crate::syntax::Expr;
use crate::types::Type;
use crate::values::Value;
use hashbrown::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolved declarations shared by an [`Env`] and the programs it compiles.
pub(crate) struct EnvInner {
    pub(crate) functions: HashMap<String, Vec<OverloadDecl>>,
    pub(crate) variables: HashMap<String, Type>,
    pub(crate) types: Vec<Type>,
    pub(crate) provider: Arc<dyn TypeProvider>,
    pub(crate) adapter: Arc<dyn TypeAdapter>,
    pub(crate) globals: Option<Arc<dyn Activation + Send + Sync>>,
    pub(crate) execution: ExecutionOptions,
}

/// A checked set of declarations against which expressions are compiled.
///
/// # Example
///
/// ```
/// use hostbind_core::api::{Env, EnvOptions, VariableDecl, MapActivation};
/// use hostbind_core::syntax::Expr;
/// use hostbind_core::types::Type;
/// use hostbind_core::values::Value;
///
/// let env = Env::new(EnvOptions {
///     variables: vec![VariableDecl { name: "x".into(), ty: Type::int() }],
///     ..Default::default()
/// });
/// let program = env.compile(&Expr::add(Expr::ident("x"), Expr::int(1))).unwrap();
/// let result = program.eval(&MapActivation::new().with("x", 41i64)).unwrap();
/// assert_eq!(result, Value::Int(42));
/// ```
#[derive(Clone)]
pub struct Env {
    inner: Arc<EnvInner>,
}

static_assertions::assert_impl_all!(Env: Send, Sync);
static_assertions::assert_impl_all!(Program: Send, Sync);

impl Env {
    pub fn new(options: EnvOptions) -> Self {
        let mut functions: HashMap<String, Vec<OverloadDecl>> = HashMap::new();
        let mut seen = HashSet::new();
        for decl in options.functions {
            for overload in decl.overloads {
                if !seen.insert(overload.id.clone()) {
                    warn!(overload = %overload.id, "Ignoring duplicate overload");
                    continue;
                }
                functions
                    .entry(decl.name.clone())
                    .or_default()
                    .push(overload);
            }
        }
        let variables = options
            .variables
            .into_iter()
            .map(|v| (v.name, v.ty))
            .collect::<HashMap<_, _>>();
        debug!(
            functions = functions.len(),
            variables = variables.len(),
            types = options.types.len(),
            "Environment created"
        );
        Env {
            inner: Arc::new(EnvInner {
                functions,
                variables,
                types: options.types,
                provider: options
                    .provider
                    .unwrap_or_else(|| Arc::new(BuiltinProvider)),
                adapter: options.adapter.unwrap_or_else(|| Arc::new(BuiltinAdapter)),
                globals: options.globals,
                execution: options.execution,
            }),
        }
    }

    /// Checks `expr` against the declarations.
    pub fn compile(&self, expr: &Expr) -> Result<Program, CheckError> {
        let (expr, ty) = analyzer::analyze(&self.inner, expr)?;
        debug!(result_type = %ty, "Compiled expression");
        Ok(Program {
            env: self.inner.clone(),
            expr,
            ty,
            options: self.inner.execution.clone(),
        })
    }

    pub fn adapter(&self) -> &dyn TypeAdapter {
        self.inner.adapter.as_ref()
    }

    pub fn provider(&self) -> &dyn TypeProvider {
        self.inner.provider.as_ref()
    }

    /// Overloads declared under `name`, in declaration order.
    pub fn function(&self, name: &str) -> &[OverloadDecl] {
        self.inner
            .functions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn variable(&self, name: &str) -> Option<&Type> {
        self.inner.variables.get(name)
    }

    /// Types the environment was configured with.
    pub fn types(&self) -> &[Type] {
        &self.inner.types
    }
}

/// A checked expression ready for evaluation.
#[derive(Clone)]
pub struct Program {
    env: Arc<EnvInner>,
    expr: Expr,
    ty: Type,
    options: ExecutionOptions,
}

impl Program {
    /// Static result type computed during checking.
    pub fn result_type(&self) -> &Type {
        &self.ty
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    /// Evaluates against `activation`, layered over the environment globals.
    ///
    /// An error value produced by evaluation is returned as `Err`.
    pub fn eval(&self, activation: &dyn Activation) -> Result<Value, EvalError> {
        let result = match &self.env.globals {
            Some(globals) => {
                let layered = HierarchicalActivation::new(globals.as_ref(), activation);
                Evaluator::new(&self.env, &layered, self.options.max_depth).eval(&self.expr)
            }
            None => Evaluator::new(&self.env, activation, self.options.max_depth).eval(&self.expr),
        };
        match result {
            Value::Error(e) => Err(e.as_ref().clone()),
            v => Ok(v),
        }
    }

    /// Evaluates with host values bound to names through the environment adapter.
    pub fn eval_native(&self, bindings: &[(&str, &dyn Reflect)]) -> Result<Value, EvalError> {
        let mut activation = MapActivation::new();
        for (name, value) in bindings {
            activation.insert_native(name, *value, self.env.adapter.as_ref());
        }
        self.eval(&activation)
    }

    /// Evaluates with no per-call bindings.
    pub fn eval_empty(&self) -> Result<Value, EvalError> {
        self.eval(&EmptyActivation)
    }
}

//! Host functions as engine overloads.
//!
//! A host closure is turned into a [`NativeFunction`] through
//! [`IntoNativeFunction`], which records its parameter and result host types
//! and builds a type-erased invoker. The [`FunctionBinder`] validates that
//! signature, maps it to engine types and stores the resulting overload
//! under a unique id.

use super::RegistrationError;
use super::adapter::ValueAdapter;
use crate::api::{Binding, FunctionDecl, OverloadDecl};
use crate::evaluator::EvalError;
use crate::reflect::{FromValue, HostType, Reflect, Typed};
use crate::types::Type;
use crate::values::Value;
use hashbrown::HashSet;
use std::any::type_name;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Results
// ============================================================================

/// Result slots of a host function, as its signature declares them.
#[derive(Debug, Clone)]
pub enum ResultShape {
    /// `()`: no result.
    None,
    Single(HostType),
    /// `Result<T, E>`: a payload and an error slot.
    Fallible(HostType),
    /// Two results, the second not an error.
    Pair(HostType, HostType),
    /// More than two results.
    Many(usize),
}

/// Return types a host function may have.
pub trait FnResult: 'static {
    fn shape() -> ResultShape;

    /// Adapts the returned value. `Err` becomes an error value.
    fn adapt(self, adapter: &ValueAdapter) -> Value;
}

impl FnResult for () {
    fn shape() -> ResultShape {
        ResultShape::None
    }

    fn adapt(self, _adapter: &ValueAdapter) -> Value {
        Value::Null
    }
}

impl<T: Reflect + Typed> FnResult for T {
    fn shape() -> ResultShape {
        ResultShape::Single(T::host_type())
    }

    fn adapt(self, adapter: &ValueAdapter) -> Value {
        adapter.adapt_owned(self)
    }
}

impl<T: Reflect + Typed, E: Display + 'static> FnResult for Result<T, E> {
    fn shape() -> ResultShape {
        ResultShape::Fallible(T::host_type())
    }

    fn adapt(self, adapter: &ValueAdapter) -> Value {
        match self {
            Ok(v) => adapter.adapt_owned(v),
            Err(e) => Value::error(EvalError::Native(e.to_string())),
        }
    }
}

impl<A: Reflect + Typed, B: Typed + 'static> FnResult for (A, B) {
    fn shape() -> ResultShape {
        ResultShape::Pair(A::host_type(), B::host_type())
    }

    fn adapt(self, adapter: &ValueAdapter) -> Value {
        adapter.adapt_owned(self.0)
    }
}

impl<A: 'static, B: 'static, C: 'static> FnResult for (A, B, C) {
    fn shape() -> ResultShape {
        ResultShape::Many(3)
    }

    fn adapt(self, _adapter: &ValueAdapter) -> Value {
        Value::error(EvalError::Native("too many results".to_string()))
    }
}

// ============================================================================
// Native functions
// ============================================================================

type NullaryFn = dyn Fn(&ValueAdapter) -> Value + Send + Sync;
type UnaryFn = dyn Fn(&ValueAdapter, &Value) -> Value + Send + Sync;
type BinaryFn = dyn Fn(&ValueAdapter, &Value, &Value) -> Value + Send + Sync;
type VariadicFn = dyn Fn(&ValueAdapter, &[Value]) -> Value + Send + Sync;

/// Type-erased call path, one per arity class.
#[derive(Clone)]
pub(crate) enum Invoker {
    Nullary(Arc<NullaryFn>),
    Unary(Arc<UnaryFn>),
    Binary(Arc<BinaryFn>),
    Variadic(Arc<VariadicFn>),
}

/// A host callable with its signature.
#[derive(Clone)]
pub struct NativeFunction {
    /// Rust type name of the callable, for diagnostics.
    name: &'static str,
    params: Vec<HostType>,
    result: ResultShape,
    invoker: Invoker,
}

impl NativeFunction {
    fn new<F, R: FnResult>(params: Vec<HostType>, invoker: Invoker) -> Self {
        NativeFunction {
            name: type_name::<F>(),
            params,
            result: R::shape(),
            invoker,
        }
    }

    pub fn params(&self) -> &[HostType] {
        &self.params
    }

    pub fn result(&self) -> &ResultShape {
        &self.result
    }

    /// Binds the invoker to `adapter`, which re-adapts every result.
    fn binding(&self, adapter: &ValueAdapter) -> Binding {
        let adapter = adapter.clone();
        match self.invoker.clone() {
            Invoker::Nullary(f) => Binding::Nullary(Arc::new(move || f(&adapter))),
            Invoker::Unary(f) => Binding::Unary(Arc::new(move |a: &Value| f(&adapter, a))),
            Invoker::Binary(f) => {
                Binding::Binary(Arc::new(move |a: &Value, b: &Value| f(&adapter, a, b)))
            }
            Invoker::Variadic(f) => {
                Binding::Variadic(Arc::new(move |args: &[Value]| f(&adapter, args)))
            }
        }
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("result", &self.result)
            .finish()
    }
}

/// Closures and fn items usable as host functions.
///
/// Implemented for callables of up to six arguments whose parameters are
/// `FromValue + Typed` and whose result is a [`FnResult`]. `Args` is the
/// tuple of parameter types; it only disambiguates the impls.
pub trait IntoNativeFunction<Args>: Send + Sync + 'static {
    fn into_native(self) -> NativeFunction;
}

/// Wraps a host callable for [`Registry::register`](super::Registry::register).
pub fn native<Args, F: IntoNativeFunction<Args>>(f: F) -> NativeFunction {
    f.into_native()
}

fn arg<T: FromValue>(value: &Value) -> Result<T, Value> {
    T::from_value(value).map_err(Value::error)
}

fn arity_mismatch(expected: usize, found: usize) -> Value {
    Value::error(EvalError::Native(format!(
        "expected {expected} argument(s), found {found}"
    )))
}

impl<F, R> IntoNativeFunction<()> for F
where
    F: Fn() -> R + Send + Sync + 'static,
    R: FnResult,
{
    fn into_native(self) -> NativeFunction {
        NativeFunction::new::<F, R>(
            vec![],
            Invoker::Nullary(Arc::new(move |adapter: &ValueAdapter| self().adapt(adapter))),
        )
    }
}

impl<F, R, A> IntoNativeFunction<(A,)> for F
where
    F: Fn(A) -> R + Send + Sync + 'static,
    R: FnResult,
    A: FromValue + Typed + 'static,
{
    fn into_native(self) -> NativeFunction {
        NativeFunction::new::<F, R>(
            vec![A::host_type()],
            Invoker::Unary(Arc::new(move |adapter: &ValueAdapter, a: &Value| {
                match arg::<A>(a) {
                    Ok(a) => self(a).adapt(adapter),
                    Err(e) => e,
                }
            })),
        )
    }
}

impl<F, R, A, B> IntoNativeFunction<(A, B)> for F
where
    F: Fn(A, B) -> R + Send + Sync + 'static,
    R: FnResult,
    A: FromValue + Typed + 'static,
    B: FromValue + Typed + 'static,
{
    fn into_native(self) -> NativeFunction {
        NativeFunction::new::<F, R>(
            vec![A::host_type(), B::host_type()],
            Invoker::Binary(Arc::new(move |adapter: &ValueAdapter, a: &Value, b: &Value| {
                match (arg::<A>(a), arg::<B>(b)) {
                    (Ok(a), Ok(b)) => self(a, b).adapt(adapter),
                    (Err(e), _) | (_, Err(e)) => e,
                }
            })),
        )
    }
}

macro_rules! impl_variadic {
    ($len:literal; $($param:ident $idx:tt),+) => {
        impl<F, R, $($param),+> IntoNativeFunction<($($param,)+)> for F
        where
            F: Fn($($param),+) -> R + Send + Sync + 'static,
            R: FnResult,
            $($param: FromValue + Typed + 'static,)+
        {
            #[allow(non_snake_case)]
            fn into_native(self) -> NativeFunction {
                NativeFunction::new::<F, R>(
                    vec![$($param::host_type()),+],
                    Invoker::Variadic(Arc::new(move |adapter: &ValueAdapter, args: &[Value]| {
                        if args.len() != $len {
                            return arity_mismatch($len, args.len());
                        }
                        $(
                            let $param = match arg::<$param>(&args[$idx]) {
                                Ok(v) => v,
                                Err(e) => return e,
                            };
                        )+
                        self($($param),+).adapt(adapter)
                    })),
                )
            }
        }
    };
}

impl_variadic!(3; A 0, B 1, C 2);
impl_variadic!(4; A 0, B 1, C 2, D 3);
impl_variadic!(5; A 0, B 1, C 2, D 3, E 4);
impl_variadic!(6; A 0, B 1, C 2, D 3, E 4, G 5);

// ============================================================================
// Binder
// ============================================================================

/// Validates host functions and stores their overloads.
///
/// Overloads are identified by [`overload_id`](crate::api::overload_id);
/// binding a signature that is already present is a no-op.
#[derive(Default)]
pub struct FunctionBinder {
    functions: BTreeMap<String, Vec<OverloadDecl>>,
    ids: HashSet<String>,
}

impl FunctionBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `function` and adds it as an overload of `name`.
    ///
    /// Returns `Ok(false)` when an identical overload already exists.
    pub fn bind(
        &mut self,
        name: &str,
        function: &NativeFunction,
        member: bool,
        adapter: &ValueAdapter,
    ) -> Result<bool, RegistrationError> {
        let result = match &function.result {
            ResultShape::None => return Err(RegistrationError::MissingResult),
            ResultShape::Many(_) => return Err(RegistrationError::TooManyResults),
            ResultShape::Pair(..) => {
                return Err(RegistrationError::LastResultNotError(function.name.to_string()));
            }
            ResultShape::Single(host) | ResultShape::Fallible(host) => host,
        };
        if member && function.params.is_empty() {
            return Err(RegistrationError::MissingReceiver);
        }
        let params = function
            .params
            .iter()
            .map(|p| specified_type(adapter, p))
            .collect::<Result<Vec<_>, _>>()?;
        let result = specified_type(adapter, result)?;
        let overload = OverloadDecl::new(name, params, result, member, function.binding(adapter));
        Ok(self.add_overload(name, overload))
    }

    /// Adds a prebuilt overload unless one with the same id exists.
    pub fn add_overload(&mut self, name: &str, overload: OverloadDecl) -> bool {
        if !self.ids.insert(overload.id.clone()) {
            debug!(overload = %overload.id, "Overload already registered");
            return false;
        }
        debug!(function = name, overload = %overload.id, "Registered overload");
        self.functions
            .entry(name.to_string())
            .or_default()
            .push(overload);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn overloads(&self, name: &str) -> &[OverloadDecl] {
        self.functions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All functions, sorted by name.
    pub fn declarations(&self) -> Vec<FunctionDecl> {
        self.functions
            .iter()
            .map(|(name, overloads)| FunctionDecl {
                name: name.clone(),
                overloads: overloads.clone(),
            })
            .collect()
    }
}

fn specified_type(adapter: &ValueAdapter, host: &HostType) -> Result<Type, RegistrationError> {
    let ty = adapter.engine_type(host)?;
    if ty.is_null() {
        return Err(RegistrationError::UnspecifiedType(host.name().to_string()));
    }
    Ok(ty)
}

use super::{EvalError, operators};
use crate::api::{Activation, EnvInner};
use crate::syntax::Expr;
use crate::syntax::operators::{CONDITIONAL, LOGICAL_AND, LOGICAL_OR, SIZE};
use crate::values::{MapKey, Value};
use smallvec::SmallVec;
use tracing::trace;

pub(crate) struct Evaluator<'a> {
    env: &'a EnvInner,
    activation: &'a dyn Activation,
    depth: usize,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(env: &'a EnvInner, activation: &'a dyn Activation, max_depth: usize) -> Self {
        Self {
            env,
            activation,
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Value {
        if self.depth >= self.max_depth {
            return Value::error(EvalError::DepthExceeded {
                depth: self.depth + 1,
                max_depth: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self.eval_inner(expr);
        self.depth -= 1;
        result
    }

    fn eval_inner(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Literal(v) => v.clone(),
            Expr::Ident(name) => self.resolve(name),
            Expr::Select {
                operand,
                field,
                test_only,
            } => {
                let operand = self.eval(operand);
                if operand.is_error() {
                    return operand;
                }
                if *test_only {
                    select_test(&operand, field)
                } else {
                    select(&operand, field)
                }
            }
            Expr::Call {
                function,
                target,
                args,
            } => match (function.as_str(), target, args.as_slice()) {
                (LOGICAL_AND, None, [a, b]) => self.logical(a, b, false),
                (LOGICAL_OR, None, [a, b]) => self.logical(a, b, true),
                (CONDITIONAL, None, [c, t, f]) => match self.eval(c) {
                    Value::Bool(true) => self.eval(t),
                    Value::Bool(false) => self.eval(f),
                    err @ Value::Error(_) => err,
                    other => Value::error(EvalError::no_such_overload(CONDITIONAL, &[other])),
                },
                _ => {
                    let mut values: SmallVec<[Value; 4]> = SmallVec::new();
                    for e in target.iter().map(|t| t.as_ref()).chain(args.iter()) {
                        let v = self.eval(e);
                        if v.is_error() {
                            return v;
                        }
                        values.push(v);
                    }
                    self.dispatch(function, target.is_some(), &values)
                }
            },
            Expr::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let v = self.eval(item);
                    if v.is_error() {
                        return v;
                    }
                    out.push(v);
                }
                Value::list(out)
            }
            Expr::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let key = match MapKey::from_value(&self.eval(k)) {
                        Ok(key) => key,
                        Err(e) => return Value::error(e),
                    };
                    let v = self.eval(v);
                    if v.is_error() {
                        return v;
                    }
                    out.push((key, v));
                }
                Value::map(out)
            }
            Expr::Struct { type_name, fields } => {
                let mut values = Vec::with_capacity(fields.len());
                for (name, e) in fields {
                    let v = self.eval(e);
                    if v.is_error() {
                        return v;
                    }
                    values.push((name.clone(), v));
                }
                self.env.provider.new_value(type_name, &values)
            }
        }
    }

    fn resolve(&self, name: &str) -> Value {
        self.activation
            .resolve(name)
            .or_else(|| self.env.provider.find_ident(name))
            .unwrap_or_else(|| Value::error(EvalError::UnknownIdentifier(name.to_string())))
    }

    /// `&&` (`absorbing = false`) and `||` (`absorbing = true`).
    ///
    /// The absorbing value wins over errors on either side; resource errors
    /// are never absorbed.
    fn logical(&mut self, lhs: &Expr, rhs: &Expr, absorbing: bool) -> Value {
        let l = self.eval(lhs);
        if l.as_bool() == Some(absorbing) || is_fatal(&l) {
            return l;
        }
        let r = self.eval(rhs);
        if r.as_bool() == Some(absorbing) || is_fatal(&r) {
            return r;
        }
        match (&l, &r) {
            (Value::Error(_), _) => l,
            (_, Value::Error(_)) => r,
            (Value::Bool(_), Value::Bool(_)) => Value::Bool(!absorbing),
            _ => {
                let name = if absorbing { LOGICAL_OR } else { LOGICAL_AND };
                Value::error(EvalError::no_such_overload(name, &[l, r]))
            }
        }
    }

    fn dispatch(&self, function: &str, member: bool, args: &[Value]) -> Value {
        if let Some(overloads) = self.env.functions.get(function) {
            if let Some(o) = overloads
                .iter()
                .find(|o| o.member == member && o.accepts(args))
            {
                trace!(overload = %o.id, "Dispatching");
                return o.binding.invoke(args);
            }
        }
        if !member || function == SIZE {
            if let Some(v) = operators::apply(function, args) {
                return v;
            }
        }
        Value::error(EvalError::no_such_overload(function, args))
    }
}

fn is_fatal(v: &Value) -> bool {
    matches!(v.as_error(), Some(EvalError::DepthExceeded { .. }))
}

fn select(operand: &Value, field: &str) -> Value {
    match operand {
        Value::Object(obj) => obj.get_field(field),
        Value::Map(map) => map
            .get(&MapKey::from(field))
            .cloned()
            .unwrap_or_else(|| Value::error(EvalError::NoSuchKey(field.to_string()))),
        _ => Value::error(EvalError::NoSuchField(field.to_string())),
    }
}

fn select_test(operand: &Value, field: &str) -> Value {
    match operand {
        Value::Object(obj) => obj.has_field(field),
        Value::Map(map) => Value::Bool(map.get(&MapKey::from(field)).is_some()),
        _ => Value::error(EvalError::NoSuchField(field.to_string())),
    }
}

//! Declaration checking.
//!
//! Resolves identifiers (including dotted qualified names), functions and
//! object fields against an environment and computes the result type of an
//! expression. `dyn` operands defer checks to runtime.
//!
//! The output tree has qualified names collapsed into single identifiers so
//! the evaluator never has to repeat the resolution.

use super::builtins;
use super::error::CheckError;
use crate::api::EnvInner;
use crate::syntax::Expr;
use crate::syntax::operators::{
    CONDITIONAL, EQUALS, LOGICAL_AND, LOGICAL_OR, NOT_EQUALS, is_comparison,
};
use crate::types::{Type, TypeKind};
use tracing::trace;

/// Checks `expr`, returning the resolved tree and its type.
pub(crate) fn analyze(env: &EnvInner, expr: &Expr) -> Result<(Expr, Type), CheckError> {
    Analyzer { env }.check(expr)
}

struct Analyzer<'a> {
    env: &'a EnvInner,
}

impl Analyzer<'_> {
    fn check(&self, expr: &Expr) -> Result<(Expr, Type), CheckError> {
        match expr {
            Expr::Literal(v) => Ok((expr.clone(), v.ty())),
            Expr::Ident(name) => self
                .lookup_ident(name)
                .map(|ty| (expr.clone(), ty))
                .ok_or_else(|| CheckError::UndeclaredReference(name.clone())),
            Expr::Select {
                operand,
                field,
                test_only,
            } => {
                if !test_only {
                    if let Some(name) = expr.qualified_name() {
                        if let Some(ty) = self.lookup_ident(&name) {
                            trace!(name = %name, "Resolved qualified identifier");
                            return Ok((Expr::Ident(name), ty));
                        }
                    }
                }
                let (operand, operand_ty) = self.check(operand)?;
                let field_ty = self.field_type(&operand_ty, field)?;
                let ty = if *test_only { Type::bool() } else { field_ty };
                Ok((
                    Expr::Select {
                        operand: Box::new(operand),
                        field: field.clone(),
                        test_only: *test_only,
                    },
                    ty,
                ))
            }
            Expr::Call {
                function,
                target,
                args,
            } => self.check_call(function, target.as_deref(), args),
            Expr::List(items) => {
                let (items, types) = self.check_all(items)?;
                Ok((Expr::List(items), Type::list(common_type(&types))))
            }
            Expr::Map(entries) => {
                let mut out = Vec::with_capacity(entries.len());
                let mut key_types = Vec::with_capacity(entries.len());
                let mut value_types = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let (k, kt) = self.check(k)?;
                    let (v, vt) = self.check(v)?;
                    out.push((k, v));
                    key_types.push(kt);
                    value_types.push(vt);
                }
                Ok((
                    Expr::Map(out),
                    Type::map(common_type(&key_types), common_type(&value_types)),
                ))
            }
            Expr::Struct { type_name, fields } => {
                let ty = self
                    .env
                    .provider
                    .find_struct_type(type_name)
                    .ok_or_else(|| CheckError::UnknownType(type_name.clone()))?;
                let mut out = Vec::with_capacity(fields.len());
                for (name, value) in fields {
                    let (value, value_ty) = self.check(value)?;
                    let field_ty = self
                        .env
                        .provider
                        .find_field_type(type_name, name)
                        .ok_or_else(|| CheckError::UndefinedField {
                            type_name: type_name.clone(),
                            field: name.clone(),
                        })?;
                    expect_assignable(&field_ty, &value_ty)?;
                    out.push((name.clone(), value));
                }
                Ok((
                    Expr::Struct {
                        type_name: type_name.clone(),
                        fields: out,
                    },
                    ty,
                ))
            }
        }
    }

    fn check_all(&self, exprs: &[Expr]) -> Result<(Vec<Expr>, Vec<Type>), CheckError> {
        let mut out = Vec::with_capacity(exprs.len());
        let mut types = Vec::with_capacity(exprs.len());
        for e in exprs {
            let (e, t) = self.check(e)?;
            out.push(e);
            types.push(t);
        }
        Ok((out, types))
    }

    fn lookup_ident(&self, name: &str) -> Option<Type> {
        if let Some(ty) = self.env.variables.get(name) {
            return Some(ty.clone());
        }
        self.env.provider.find_ident(name).map(|v| v.ty())
    }

    fn field_type(&self, operand: &Type, field: &str) -> Result<Type, CheckError> {
        match operand.kind() {
            TypeKind::Dyn => Ok(Type::dyn_()),
            TypeKind::Map(key, value) if key.is_assignable_from(&Type::string()) => {
                Ok(value.clone())
            }
            TypeKind::Object(obj) => self
                .env
                .provider
                .find_field_type(&obj.name, field)
                .ok_or_else(|| CheckError::UndefinedField {
                    type_name: obj.name.to_string(),
                    field: field.to_string(),
                }),
            TypeKind::Nullable(inner) => self.field_type(inner, field),
            _ => Err(CheckError::NotSelectable {
                type_name: operand.to_string(),
            }),
        }
    }

    fn check_call(
        &self,
        function: &str,
        target: Option<&Expr>,
        args: &[Expr],
    ) -> Result<(Expr, Type), CheckError> {
        let (checked_target, target_ty) = match target {
            Some(t) => {
                let (t, ty) = self.check(t)?;
                (Some(Box::new(t)), Some(ty))
            }
            None => (None, None),
        };
        let (checked_args, arg_types) = self.check_all(args)?;
        let rebuilt = Expr::Call {
            function: function.to_string(),
            target: checked_target,
            args: checked_args,
        };

        if target.is_none() {
            if let Some(ty) = self.check_special(function, &arg_types)? {
                return Ok((rebuilt, ty));
            }
        }

        let all: Vec<Type> = target_ty.into_iter().chain(arg_types).collect();
        let member = target.is_some();
        let declared = self.env.functions.get(function);

        let results: Vec<&Type> = declared
            .into_iter()
            .flatten()
            .filter(|o| o.member == member && o.params.len() == all.len())
            .filter(|o| o.params.iter().zip(&all).all(|(p, a)| p.is_assignable_from(a)))
            .map(|o| &o.result)
            .collect();

        if let Some(first) = results.first() {
            // Comparisons yield bool whatever result a library declares.
            let ty = if is_comparison(function) {
                Type::bool()
            } else if results.iter().all(|r| r == first) {
                (*first).clone()
            } else {
                Type::dyn_()
            };
            return Ok((rebuilt, ty));
        }
        if let Some(ty) = builtins::result_type(function, &all, member) {
            return Ok((rebuilt, ty));
        }
        if declared.is_none() && !is_builtin(function) {
            return Err(CheckError::UnknownFunction(function.to_string()));
        }
        Err(CheckError::NoMatchingOverload {
            function: function.to_string(),
            args: all
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Operators that apply to every type.
    fn check_special(&self, function: &str, args: &[Type]) -> Result<Option<Type>, CheckError> {
        match (function, args) {
            (EQUALS | NOT_EQUALS, [_, _]) => Ok(Some(Type::bool())),
            (LOGICAL_AND | LOGICAL_OR, [a, b]) => {
                expect_assignable(&Type::bool(), a)?;
                expect_assignable(&Type::bool(), b)?;
                Ok(Some(Type::bool()))
            }
            (CONDITIONAL, [cond, then, otherwise]) => {
                expect_assignable(&Type::bool(), cond)?;
                Ok(Some(if then == otherwise {
                    then.clone()
                } else if then.is_null() {
                    Type::nullable(otherwise.clone())
                } else if otherwise.is_null() {
                    Type::nullable(then.clone())
                } else {
                    Type::dyn_()
                }))
            }
            _ => Ok(None),
        }
    }
}

fn is_builtin(function: &str) -> bool {
    use crate::syntax::operators::*;
    matches!(
        function,
        ADD | SUBTRACT
            | MULTIPLY
            | DIVIDE
            | MODULO
            | NEGATE
            | NOT
            | LESS
            | LESS_EQUALS
            | GREATER
            | GREATER_EQUALS
            | INDEX
            | IN
            | SIZE
    )
}

fn expect_assignable(expected: &Type, found: &Type) -> Result<(), CheckError> {
    if expected.is_assignable_from(found) {
        Ok(())
    } else {
        Err(CheckError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        })
    }
}

fn common_type(types: &[Type]) -> Type {
    match types.split_first() {
        Some((first, rest)) if rest.iter().all(|t| t == first) => first.clone(),
        _ => Type::dyn_(),
    }
}

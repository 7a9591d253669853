use super::CheckError;
use crate::api::{Binding, Env, EnvOptions, FunctionDecl, OverloadDecl, VariableDecl};
use crate::syntax::Expr;
use crate::syntax::operators::LESS;
use crate::types::{Traits, Type};
use crate::values::Value;
use std::sync::Arc;

fn var(name: &str, ty: Type) -> VariableDecl {
    VariableDecl {
        name: name.to_string(),
        ty,
    }
}

fn env_with(variables: Vec<VariableDecl>, functions: Vec<FunctionDecl>) -> Env {
    Env::new(EnvOptions {
        variables,
        functions,
        ..Default::default()
    })
}

fn check(env: &Env, expr: &Expr) -> Result<Type, CheckError> {
    env.compile(expr).map(|p| p.result_type().clone())
}

fn unary(name: &str, param: Type, result: Type) -> FunctionDecl {
    let binding = Binding::Unary(Arc::new(|v: &Value| v.clone()));
    FunctionDecl {
        name: name.to_string(),
        overloads: vec![OverloadDecl::new(name, vec![param], result, false, binding)],
    }
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_declared_variable() {
    let env = env_with(vec![var("x", Type::int())], vec![]);
    assert_eq!(check(&env, &Expr::ident("x")), Ok(Type::int()));
}

#[test]
fn test_undeclared_reference() {
    let env = env_with(vec![], vec![]);
    assert_eq!(
        check(&env, &Expr::ident("nope")),
        Err(CheckError::UndeclaredReference("nope".into()))
    );
}

#[test]
fn test_builtin_type_names_resolve() {
    let env = env_with(vec![], vec![]);
    assert_eq!(check(&env, &Expr::ident("int")), Ok(Type::type_()));
}

#[test]
fn test_qualified_name_collapses_to_identifier() {
    let env = env_with(vec![var("vars.count", Type::uint())], vec![]);
    let program = env
        .compile(&Expr::ident("vars").field("count"))
        .unwrap();
    assert_eq!(program.result_type(), &Type::uint());
    assert_eq!(program.expr(), &Expr::ident("vars.count"));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_map_field_selection() {
    let env = env_with(
        vec![var("m", Type::map(Type::string(), Type::double()))],
        vec![],
    );
    assert_eq!(
        check(&env, &Expr::ident("m").field("k")),
        Ok(Type::double())
    );
}

#[test]
fn test_dyn_field_selection() {
    let env = env_with(vec![var("d", Type::dyn_())], vec![]);
    assert_eq!(check(&env, &Expr::ident("d").field("a").field("b")), Ok(Type::dyn_()));
    assert_eq!(check(&env, &Expr::ident("d").has("a")), Ok(Type::bool()));
}

#[test]
fn test_scalars_are_not_selectable() {
    let env = env_with(vec![var("i", Type::int())], vec![]);
    assert_eq!(
        check(&env, &Expr::ident("i").field("a")),
        Err(CheckError::NotSelectable {
            type_name: "int".into()
        })
    );
}

#[test]
fn test_unknown_object_field() {
    let ty = Type::object("geo.Point", Traits::FIELD_TESTER);
    let env = env_with(vec![var("p", ty)], vec![]);
    assert_eq!(
        check(&env, &Expr::ident("p").field("z")),
        Err(CheckError::UndefinedField {
            type_name: "geo.Point".into(),
            field: "z".into(),
        })
    );
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_builtin_arithmetic() {
    let env = env_with(vec![var("x", Type::int())], vec![]);
    assert_eq!(
        check(&env, &Expr::add(Expr::ident("x"), Expr::int(1))),
        Ok(Type::int())
    );
    assert!(matches!(
        check(&env, &Expr::add(Expr::ident("x"), Expr::string("a"))),
        Err(CheckError::NoMatchingOverload { .. })
    ));
}

#[test]
fn test_declared_overload() {
    let env = env_with(
        vec![],
        vec![unary("shout", Type::string(), Type::string())],
    );
    let call = Expr::call("shout", vec![Expr::string("hi")]);
    assert_eq!(check(&env, &call), Ok(Type::string()));

    let bad = Expr::call("shout", vec![Expr::int(1)]);
    assert_eq!(
        check(&env, &bad),
        Err(CheckError::NoMatchingOverload {
            function: "shout".into(),
            args: "int".into(),
        })
    );
}

#[test]
fn test_member_and_global_are_distinct() {
    let env = env_with(
        vec![],
        vec![unary("shout", Type::string(), Type::string())],
    );
    let member = Expr::string("hi").method("shout", vec![]);
    assert!(matches!(
        check(&env, &member),
        Err(CheckError::NoMatchingOverload { .. })
    ));
}

#[test]
fn test_unknown_function() {
    let env = env_with(vec![], vec![]);
    assert_eq!(
        check(&env, &Expr::call("missing", vec![])),
        Err(CheckError::UnknownFunction("missing".into()))
    );
}

#[test]
fn test_comparison_overloads_yield_bool() {
    let ty = Type::object("num.Big", Traits::COMPARER);
    let binding = Binding::Binary(Arc::new(|_: &Value, _: &Value| Value::Bool(true)));
    let less = FunctionDecl {
        name: LESS.to_string(),
        overloads: vec![OverloadDecl::new(
            LESS,
            vec![ty.clone(), Type::dyn_()],
            Type::int(),
            false,
            binding,
        )],
    };
    let env = env_with(vec![var("a", ty.clone()), var("b", ty)], vec![less]);
    let expr = Expr::lt(Expr::ident("a"), Expr::ident("b"));
    assert_eq!(check(&env, &expr), Ok(Type::bool()));
}

#[test]
fn test_logical_operands_must_be_bool() {
    let env = env_with(vec![], vec![]);
    assert_eq!(
        check(&env, &Expr::and(Expr::bool(true), Expr::int(1))),
        Err(CheckError::TypeMismatch {
            expected: "bool".into(),
            found: "int".into(),
        })
    );
}

#[test]
fn test_conditional_with_null_branch_is_nullable() {
    let env = env_with(vec![], vec![]);
    let expr = Expr::cond(Expr::bool(true), Expr::int(1), Expr::null());
    assert_eq!(check(&env, &expr), Ok(Type::nullable(Type::int())));
}

#[test]
fn test_list_and_map_literals() {
    let env = env_with(vec![], vec![]);
    assert_eq!(
        check(&env, &Expr::list(vec![Expr::int(1), Expr::int(2)])),
        Ok(Type::list(Type::int()))
    );
    assert_eq!(
        check(&env, &Expr::list(vec![Expr::int(1), Expr::string("a")])),
        Ok(Type::list(Type::dyn_()))
    );
    assert_eq!(
        check(
            &env,
            &Expr::map(vec![(Expr::string("k"), Expr::bool(true))])
        ),
        Ok(Type::map(Type::string(), Type::bool()))
    );
}

#[test]
fn test_unknown_struct_type() {
    let env = env_with(vec![], vec![]);
    assert_eq!(
        check(&env, &Expr::new_struct("geo.Point", vec![])),
        Err(CheckError::UnknownType("geo.Point".into()))
    );
}

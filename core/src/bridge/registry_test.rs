use super::*;
use crate::Native;
use crate::api::{Env, MapActivation, TypeProvider};
use crate::evaluator::EvalError;
use crate::reflect::{Reflect, Typed};
use crate::syntax::Expr;
use crate::test_utils::init_test_logging;
use crate::types::Type;
use crate::values::Value;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Native)]
#[native(default)]
pub struct Address {
    #[native(json = "city")]
    pub city: String,
    #[native(json = "zip")]
    pub zip: String,
}

#[derive(Clone, Debug, Default, PartialEq, Native)]
pub struct Person {
    #[native(json = "name")]
    pub name: String,
    #[native(json = "age")]
    pub age: u32,
    #[native(json = "home")]
    pub home: Option<Box<Address>>,
}

fn json_registry() -> Registry {
    Registry::new(RegistryOptions::default().with_tag_name("json"))
}

fn type_name<T: Typed>() -> String {
    T::host_type().qualified_name()
}

fn eval(registry: Registry, expr: &Expr) -> Result<Value, EvalError> {
    let registry = Arc::new(registry);
    let env = Env::new(registry.compile_options());
    env.compile(expr)
        .unwrap_or_else(|e| panic!("check failed: {e}"))
        .eval_empty()
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_register_scalar_value() {
    init_test_logging();
    let mut registry = json_registry();
    registry.register("limit", 10i64).unwrap();
    let decls = registry.variable_decls();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].ty, Type::int());
    assert_eq!(
        eval(registry, &Expr::mul(Expr::ident("limit"), Expr::int(2))),
        Ok(Value::Int(20))
    );
}

#[test]
fn test_first_registration_wins() {
    let mut registry = json_registry();
    registry.register("x", 1i64).unwrap();
    registry.register("x", "two".to_string()).unwrap();
    assert_eq!(registry.variable_decls()[0].ty, Type::int());
    assert_eq!(eval(registry, &Expr::ident("x")), Ok(Value::Int(1)));
}

#[test]
fn test_engine_value_uses_its_type_hint() {
    let mut registry = json_registry();
    registry
        .register("tags", Value::list([Value::string("a")]))
        .unwrap();
    assert_eq!(
        registry.variable_decls()[0].ty,
        Type::list(Type::dyn_())
    );
}

#[test]
fn test_unadaptable_value() {
    let mut registry = json_registry();
    let (tx, _rx) = std::sync::mpsc::channel::<i64>();
    assert!(matches!(
        registry.register("chan", tx),
        Err(RegistrationError::UnsupportedType(_))
    ));
    assert!(registry.variable_decls().is_empty());
}

#[test]
fn test_struct_fields_resolve() {
    let mut registry = json_registry();
    registry
        .register(
            "p",
            Person {
                name: "Ada".into(),
                age: 36,
                home: Some(Box::new(Address {
                    city: "London".into(),
                    zip: "N1".into(),
                })),
            },
        )
        .unwrap();
    let expr = Expr::add(
        Expr::ident("p").field("name"),
        Expr::ident("p").field("home").field("city"),
    );
    assert_eq!(eval(registry, &expr), Ok(Value::string("AdaLondon")));
}

#[test]
fn test_reachable_struct_types_are_registered() {
    let mut registry = json_registry();
    registry.register("p", Person::default()).unwrap();
    let names: Vec<String> = registry
        .types()
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert!(names.contains(&type_name::<Person>()));
    assert!(names.contains(&type_name::<Address>()));
    assert_eq!(
        registry.find_field_type(&type_name::<Person>(), "age"),
        Some(Type::uint())
    );
    assert_eq!(
        registry.find_field_type(&type_name::<Person>(), "home"),
        Some(Type::nullable(registry.find_struct_type(&type_name::<Address>()).unwrap()))
    );
    assert_eq!(registry.find_field_type(&type_name::<Person>(), "Name"), None);
}

#[test]
fn test_has_field_checks_zero_values() {
    let mut registry = json_registry();
    registry
        .register(
            "p",
            Person {
                name: "Ada".into(),
                ..Default::default()
            },
        )
        .unwrap();
    let expr = Expr::and(
        Expr::ident("p").has("name"),
        Expr::not(Expr::ident("p").has("home")),
    );
    assert_eq!(eval(registry, &expr), Ok(Value::Bool(true)));
}

// ============================================================================
// Types
// ============================================================================

#[test]
fn test_register_type_rejects_non_structs() {
    let mut registry = json_registry();
    assert_eq!(
        registry.register_type::<i64>(),
        Err(RegistrationError::NotAStruct("i64".into()))
    );
    registry.register_type::<Box<Address>>().unwrap();
    assert!(registry.find_struct_type(&type_name::<Address>()).is_some());
}

#[test]
fn test_type_names_resolve_as_identifiers() {
    let mut registry = json_registry();
    registry.register_type::<Address>().unwrap();
    let ty = registry.find_struct_type(&type_name::<Address>()).unwrap();
    assert_eq!(
        registry.find_ident(&type_name::<Address>()),
        Some(Value::Type(ty))
    );
    assert_eq!(registry.find_ident("int"), Some(Value::Type(Type::int())));
}

#[test]
fn test_construct_struct() {
    let mut registry = json_registry();
    registry.register_type::<Address>().unwrap();
    let name = type_name::<Address>();
    let expr = Expr::new_struct(&name, vec![("city", Expr::string("Oslo"))]).field("city");
    assert_eq!(eval(registry, &expr), Ok(Value::string("Oslo")));
}

#[test]
fn test_construct_reports_bad_fields() {
    let mut registry = json_registry();
    registry.register_type::<Address>().unwrap();
    let name = type_name::<Address>();
    let value = registry.new_value(&name, &[("street".into(), Value::string("x"))]);
    assert_eq!(
        value.as_error(),
        Some(&EvalError::NoSuchField("street".into()))
    );
    let value = registry.new_value(&name, &[("city".into(), Value::Int(1))]);
    assert!(matches!(value.as_error(), Some(EvalError::Conversion { .. })));
}

#[test]
fn test_construct_requires_default() {
    let mut registry = json_registry();
    registry.register_type::<Person>().unwrap();
    let value = registry.new_value(&type_name::<Person>(), &[]);
    assert!(matches!(value.as_error(), Some(EvalError::UnsupportedType(_))));
}

#[test]
fn test_unknown_types_fall_back_to_base_provider() {
    let registry = json_registry();
    assert!(matches!(
        registry.new_value("nope.Type", &[]).as_error(),
        Some(EvalError::UnknownType(_))
    ));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_register_function() {
    let mut registry = json_registry();
    registry
        .register("greet", native(|name: String| format!("hello {name}")))
        .unwrap();
    let expr = Expr::call("greet", vec![Expr::string("bob")]);
    assert_eq!(eval(registry, &expr), Ok(Value::string("hello bob")));
}

#[test]
fn test_register_method_on_struct() {
    let mut registry = json_registry();
    registry
        .register_method("adult", |p: Person| p.age >= 18)
        .unwrap();
    registry
        .register(
            "p",
            Person {
                age: 20,
                ..Default::default()
            },
        )
        .unwrap();
    let expr = Expr::ident("p").method("adult", vec![]);
    assert_eq!(eval(registry, &expr), Ok(Value::Bool(true)));
}

#[test]
fn test_function_signatures_register_struct_types() {
    let mut registry = json_registry();
    registry
        .register_function("move_to", |city: String| Address {
            city,
            zip: String::new(),
        })
        .unwrap();
    assert!(registry.find_struct_type(&type_name::<Address>()).is_some());
    let expr = Expr::call("move_to", vec![Expr::string("Rome")]).field("city");
    assert_eq!(eval(registry, &expr), Ok(Value::string("Rome")));
}

#[test]
fn test_function_errors_surface_at_evaluation() {
    let mut registry = json_registry();
    registry
        .register_function("checked_div", |a: i64, b: i64| {
            a.checked_div(b).ok_or("division by zero")
        })
        .unwrap();
    let expr = Expr::call("checked_div", vec![Expr::int(1), Expr::int(0)]);
    assert_eq!(
        eval(registry, &expr),
        Err(EvalError::Native("division by zero".into()))
    );
}

#[test]
fn test_invalid_function_is_rejected() {
    let mut registry = json_registry();
    assert_eq!(
        registry.register_method("nothing", || 1i64),
        Err(RegistrationError::MissingReceiver)
    );
    assert!(registry.overloads("nothing").is_empty());
}

// ============================================================================
// Conversions and variables
// ============================================================================

#[test]
fn test_conversion_overrides_struct_wrapping() {
    let mut registry = json_registry();
    registry
        .register_conversion::<Address, _>(Type::string(), |a: &Address| {
            Value::string(format!("{} {}", a.zip, a.city))
        })
        .unwrap();
    registry
        .register(
            "a",
            Address {
                city: "Paris".into(),
                zip: "75001".into(),
            },
        )
        .unwrap();
    assert_eq!(registry.variable_decls()[0].ty, Type::string());
    assert!(registry.find_struct_type(&type_name::<Address>()).is_none());
    assert_eq!(
        eval(registry, &Expr::ident("a")),
        Ok(Value::string("75001 Paris"))
    );
}

#[test]
fn test_duplicate_conversion() {
    let mut registry = json_registry();
    let rule = |a: &Address| Value::string(a.city.clone());
    registry
        .register_conversion::<Address, _>(Type::string(), rule)
        .unwrap();
    assert!(matches!(
        registry.register_conversion::<Address, _>(Type::string(), rule),
        Err(RegistrationError::DuplicateConversion(_))
    ));
}

#[test]
fn test_register_variable() {
    let mut registry = json_registry();
    registry.register_variable::<Person>("user").unwrap();
    assert_eq!(
        registry.register_variable::<i64>("user"),
        Err(RegistrationError::DuplicateVariable("user".into()))
    );

    let registry = Arc::new(registry);
    let env = Env::new(registry.compile_options());
    let program = env.compile(&Expr::ident("user").field("age")).unwrap();
    assert_eq!(program.result_type(), &Type::uint());

    let user = Person {
        age: 41,
        ..Default::default()
    };
    let user: &dyn Reflect = &user;
    assert_eq!(program.eval_native(&[("user", user)]), Ok(Value::Uint(41)));
    assert_eq!(
        program.eval(&MapActivation::new()),
        Err(EvalError::UnknownIdentifier("user".into()))
    );
}

#[test]
fn test_register_variable_after_value_is_an_error() {
    let mut registry = json_registry();
    registry.register("n", 1i64).unwrap();
    assert!(matches!(
        registry.register_variable::<i64>("n"),
        Err(RegistrationError::DuplicateVariable(_))
    ));
}

#[test]
fn test_register_object_type_requires_object() {
    let mut registry = json_registry();
    assert_eq!(
        registry.register_object_type(&Value::Int(1)),
        Err(RegistrationError::NotAnObject("int".into()))
    );
}

#[test]
fn test_compile_options_are_sorted() {
    let mut registry = json_registry();
    registry.register("b", 2i64).unwrap();
    registry.register("a", 1i64).unwrap();
    registry
        .register_function("zeta", |x: i64| x)
        .unwrap();
    registry
        .register_function("alpha", |x: i64| x)
        .unwrap();
    let registry = Arc::new(registry);
    let options = registry.compile_options();
    let vars: Vec<&str> = options.variables.iter().map(|v| v.name.as_str()).collect();
    let funcs: Vec<&str> = options.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(vars, vec!["a", "b"]);
    assert_eq!(funcs, vec!["alpha", "zeta"]);
    assert!(options.provider.is_some());
    assert!(options.globals.is_some());
}

#[derive(Clone, Debug, Default, PartialEq, Native)]
pub struct Parcel {
    #[native(json = "weight_kg")]
    pub weight: f64,
}

#[test]
fn test_registries_keep_separate_caches() {
    let mut by_tag = json_registry();
    let mut by_ident = Registry::new(RegistryOptions::default());
    by_tag.register_type::<Parcel>().unwrap();
    by_ident.register_type::<Parcel>().unwrap();
    by_tag
        .register_conversion::<Address, _>(Type::string(), |a: &Address| {
            Value::string(a.city.clone())
        })
        .unwrap();

    let name = type_name::<Parcel>();
    assert_eq!(by_tag.find_field_type(&name, "weight_kg"), Some(Type::double()));
    assert_eq!(by_tag.find_field_type(&name, "weight"), None);
    assert_eq!(by_ident.find_field_type(&name, "weight"), Some(Type::double()));
    assert_eq!(by_ident.find_field_type(&name, "weight_kg"), None);

    assert!(by_tag.adapter().has_rule(&Address::host_type()));
    assert!(!by_ident.adapter().has_rule(&Address::host_type()));
}

use super::*;
use crate::Native;
use crate::api::BuiltinAdapter;
use crate::evaluator::EvalError;
use crate::types::Type;
use crate::values::Value;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Native)]
pub struct Counter {
    pub count: i64,
}

fn adapter() -> ValueAdapter {
    ValueAdapter::new("", Arc::new(BuiltinAdapter))
}

fn bind(
    binder: &mut FunctionBinder,
    name: &str,
    f: NativeFunction,
    member: bool,
) -> Result<bool, RegistrationError> {
    binder.bind(name, &f, member, &adapter())
}

fn call(binder: &FunctionBinder, name: &str, args: &[Value]) -> Value {
    binder.overloads(name)[0].binding.invoke(args)
}

#[test]
fn test_signature_is_recorded() {
    let f = native(|a: i64, b: String| format!("{b}{a}"));
    assert_eq!(f.params().len(), 2);
    assert!(f.params()[0].is::<i64>());
    assert!(matches!(f.result(), ResultShape::Single(host) if host.is::<String>()));
}

#[test]
fn test_bind_maps_types() {
    let mut binder = FunctionBinder::new();
    assert_eq!(
        bind(&mut binder, "repeat", native(|s: String, n: u32| s.repeat(n as usize)), false),
        Ok(true)
    );
    let overload = &binder.overloads("repeat")[0];
    assert_eq!(overload.params, vec![Type::string(), Type::uint()]);
    assert_eq!(overload.result, Type::string());
    assert!(!overload.member);
    assert_eq!(overload.id, "repeat|@|string,uint|string");
}

#[test]
fn test_binding_converts_arguments_and_result() {
    let mut binder = FunctionBinder::new();
    bind(&mut binder, "repeat", native(|s: String, n: u32| s.repeat(n as usize)), false).unwrap();
    assert_eq!(
        call(&binder, "repeat", &[Value::string("ab"), Value::Uint(3)]),
        Value::string("ababab")
    );
    assert!(matches!(
        call(&binder, "repeat", &[Value::string("ab"), Value::Int(-1)]).as_error(),
        Some(EvalError::Overflow(_))
    ));
}

#[test]
fn test_identical_overload_is_ignored() {
    let mut binder = FunctionBinder::new();
    assert_eq!(bind(&mut binder, "neg", native(|i: i64| -i), false), Ok(true));
    assert_eq!(bind(&mut binder, "neg", native(|i: i64| i), false), Ok(false));
    assert_eq!(binder.overloads("neg").len(), 1);
    assert_eq!(call(&binder, "neg", &[Value::Int(2)]), Value::Int(-2));
}

#[test]
fn test_overloads_accumulate_per_name() {
    let mut binder = FunctionBinder::new();
    bind(&mut binder, "f", native(|i: i64| i), false).unwrap();
    bind(&mut binder, "f", native(|s: String| s), false).unwrap();
    bind(&mut binder, "f", native(|i: i64| i), true).unwrap();
    assert_eq!(binder.overloads("f").len(), 3);
    assert!(binder.contains("f|member@|int|int"));
    let decls = binder.declarations();
    assert_eq!(decls.len(), 1);
    assert_eq!(decls[0].name, "f");
}

#[test]
fn test_result_is_required() {
    let mut binder = FunctionBinder::new();
    assert_eq!(
        bind(&mut binder, "noop", native(|_: i64| {}), false),
        Err(RegistrationError::MissingResult)
    );
}

#[test]
fn test_second_result_must_be_error() {
    let mut binder = FunctionBinder::new();
    let pair = native(|i: i64| (i, true));
    assert!(matches!(
        bind(&mut binder, "pair", pair, false),
        Err(RegistrationError::LastResultNotError(_))
    ));
    let triple = native(|i: i64| (i, i, i));
    assert_eq!(
        bind(&mut binder, "triple", triple, false),
        Err(RegistrationError::TooManyResults)
    );
}

#[test]
fn test_result_count_is_checked_before_receiver() {
    let mut binder = FunctionBinder::new();
    assert_eq!(
        bind(&mut binder, "m", native(|| {}), true),
        Err(RegistrationError::MissingResult)
    );
    assert_eq!(
        bind(&mut binder, "m", native(|| 1i64), true),
        Err(RegistrationError::MissingReceiver)
    );
}

#[test]
fn test_unsupported_and_unspecified_types() {
    let mut binder = FunctionBinder::new();
    let chan = native(|_: std::sync::mpsc::Sender<i64>| 1i64);
    assert!(matches!(
        bind(&mut binder, "chan", chan, false),
        Err(RegistrationError::UnsupportedType(_))
    ));
    let unit = native(|_: ()| 1i64);
    assert_eq!(
        bind(&mut binder, "unit", unit, false),
        Err(RegistrationError::UnspecifiedType("()".into()))
    );
}

#[test]
fn test_fallible_results() {
    let mut binder = FunctionBinder::new();
    let parse = native(|s: String| s.parse::<i64>().map_err(|e| e.to_string()));
    bind(&mut binder, "parse", parse, false).unwrap();
    assert_eq!(binder.overloads("parse")[0].result, Type::int());
    assert_eq!(call(&binder, "parse", &[Value::string("12")]), Value::Int(12));
    assert!(matches!(
        call(&binder, "parse", &[Value::string("x")]).as_error(),
        Some(EvalError::Native(_))
    ));
}

#[test]
fn test_struct_receivers_and_results() {
    let mut binder = FunctionBinder::new();
    let bump = native(|c: Counter| Counter { count: c.count + 1 });
    bind(&mut binder, "bump", bump, true).unwrap();

    let a = adapter();
    let counter = a.adapt_owned(Counter { count: 1 });
    let bumped = call(&binder, "bump", &[counter]);
    assert_eq!(
        bumped.as_object().unwrap().get_field("count"),
        Value::Int(2)
    );
}

#[test]
fn test_variadic_arity() {
    let mut binder = FunctionBinder::new();
    let sum = native(|a: i64, b: i64, c: i64, d: i64| a + b + c + d);
    bind(&mut binder, "sum4", sum, false).unwrap();
    let args: Vec<Value> = (1..=4).map(Value::Int).collect();
    assert_eq!(call(&binder, "sum4", &args), Value::Int(10));
    assert!(matches!(
        call(&binder, "sum4", &args[..3]).as_error(),
        Some(EvalError::Native(_))
    ));
}

#[test]
fn test_dynamic_parameters() {
    let mut binder = FunctionBinder::new();
    let describe = native(|v: Value| v.ty().to_string());
    bind(&mut binder, "describe", describe, false).unwrap();
    assert_eq!(binder.overloads("describe")[0].params, vec![Type::dyn_()]);
    assert_eq!(
        call(&binder, "describe", &[Value::Double(1.0)]),
        Value::string("double")
    );
}

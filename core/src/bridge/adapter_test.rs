use super::*;
use crate::Native;
use crate::api::BuiltinAdapter;
use crate::evaluator::EvalError;
use crate::reflect::{HostType, Reflect, Typed};
use crate::types::Type;
use crate::values::{MapKey, Object, Value};
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Native)]
pub struct Point {
    #[native(json = "x")]
    pub x: i64,
    #[native(json = "y")]
    pub y: i64,
}

#[derive(Clone, Debug, PartialEq, Native)]
pub struct Path {
    pub points: Vec<Point>,
    pub origin: Option<Box<Point>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Celsius(f64);

impl Typed for Celsius {
    fn host_type() -> HostType {
        HostType::cached::<Celsius>(|| crate::reflect::HostKind::Float(64))
    }
}

impl Reflect for Celsius {
    fn reflect_type(&self) -> HostType {
        Celsius::host_type()
    }

    fn reflect_ref(&self) -> crate::reflect::ReflectRef<'_> {
        crate::reflect::ReflectRef::Float(self.0)
    }

    fn clone_reflect(&self) -> Box<dyn Reflect> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}

fn adapter() -> ValueAdapter {
    ValueAdapter::new("json", Arc::new(BuiltinAdapter))
}

#[test]
fn test_scalars_pass_to_base() {
    let a = adapter();
    assert_eq!(a.native_to_value(&3i32), Value::Int(3));
    assert_eq!(a.native_to_value(&"hi".to_string()), Value::string("hi"));
    assert_eq!(a.native_to_value(&Some(2.5f64)), Value::Double(2.5));
    assert_eq!(a.native_to_value(&None::<i64>), Value::Null);
}

#[test]
fn test_bytes_and_lists() {
    let a = adapter();
    assert_eq!(a.native_to_value(&vec![1u8, 2]), Value::bytes(&[1u8, 2][..]));
    assert_eq!(
        a.native_to_value(&vec![1i64, 2]),
        Value::list([Value::Int(1), Value::Int(2)])
    );
}

#[test]
fn test_maps() {
    let a = adapter();
    let map: BTreeMap<String, bool> = [("on".to_string(), true)].into();
    assert_eq!(
        a.native_to_value(&map),
        Value::map([(MapKey::from("on"), Value::Bool(true))])
    );
}

#[test]
fn test_timestamps() {
    let a = adapter();
    let ts = Utc.with_ymd_and_hms(2020, 5, 17, 12, 0, 0).unwrap();
    assert_eq!(a.native_to_value(&ts), Value::Timestamp(ts.fixed_offset()));
}

#[test]
fn test_engine_values_pass_through() {
    let a = adapter();
    let v = Value::list([Value::Int(1)]);
    assert_eq!(a.native_to_value(&v), v);
}

#[test]
fn test_structs_become_native_objects() {
    let a = adapter();
    let value = a.native_to_value(&Point { x: 1, y: 2 });
    let obj = value.as_object().unwrap();
    assert_eq!(obj.object_type(), a.engine_type(&Point::host_type()).unwrap());
    assert_eq!(obj.get_field("x"), Value::Int(1));
    assert_eq!(obj.get_field("y"), Value::Int(2));
    assert_eq!(
        obj.get_field("z").as_error(),
        Some(&EvalError::NoSuchField("z".into()))
    );
}

#[test]
fn test_pointer_to_struct_keeps_pointer_host() {
    let a = adapter();
    let value = a.adapt_owned(Some(Box::new(Point { x: 5, y: 6 })));
    let obj = value.as_object().unwrap();
    let native = obj.as_any().downcast_ref::<NativeObject>().unwrap();
    assert!(native.host_type().is::<Option<Box<Point>>>());
    assert_eq!(obj.get_field("x"), Value::Int(5));
}

#[test]
fn test_nested_structs_adapt_lazily() {
    let a = adapter();
    let path = Path {
        points: vec![Point { x: 1, y: 1 }, Point { x: 2, y: 2 }],
        origin: None,
    };
    let value = a.adapt_owned(path);
    let obj = value.as_object().unwrap();
    let Value::List(points) = obj.get_field("points") else {
        panic!("points should adapt to a list");
    };
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].as_object().unwrap().get_field("y"), Value::Int(2));
    assert_eq!(obj.get_field("origin"), Value::Null);
    assert_eq!(obj.has_field("origin"), Value::Bool(false));
    assert_eq!(obj.has_field("points"), Value::Bool(true));
}

#[test]
fn test_conversion_rule_takes_precedence() {
    let a = adapter();
    a.add_rule::<Celsius, _>(Type::string(), |c: &Celsius| {
        Value::string(format!("{}C", c.0))
    })
    .unwrap();
    assert_eq!(a.native_to_value(&Celsius(21.5)), Value::string("21.5C"));
    assert_eq!(a.engine_type(&Celsius::host_type()), Ok(Type::string()));
    assert!(a.has_rule(&Celsius::host_type()));
    // Rules also apply inside collections.
    assert_eq!(
        a.native_to_value(&vec![Celsius(1.0)]),
        Value::list([Value::string("1C")])
    );
}

#[test]
fn test_conversion_rule_errors() {
    let a = adapter();
    a.add_rule::<Celsius, _>(Type::double(), |c: &Celsius| Value::Double(c.0))
        .unwrap();
    assert!(matches!(
        a.add_rule::<Celsius, _>(Type::double(), |c: &Celsius| Value::Double(c.0)),
        Err(RegistrationError::DuplicateConversion(_))
    ));
    assert!(matches!(
        a.add_rule::<Value, _>(Type::dyn_(), |v: &Value| v.clone()),
        Err(RegistrationError::InvalidConversion(_))
    ));
}

#[test]
fn test_collection_fails_as_a_whole() {
    let a = adapter();
    let (tx, _rx) = std::sync::mpsc::channel::<i64>();
    let value = a.native_to_value(&vec![tx]);
    assert!(matches!(
        value.as_error(),
        Some(EvalError::UnsupportedType(_))
    ));
}

#[test]
fn test_object_equality_normalizes_one_pointer_level() {
    let a = adapter();
    let direct = a.adapt_owned(Point { x: 1, y: 2 });
    let boxed = a.adapt_owned(Box::new(Point { x: 1, y: 2 }));
    let other = a.adapt_owned(Point { x: 1, y: 3 });
    assert_eq!(direct, boxed);
    assert_eq!(boxed, direct);
    assert_ne!(direct, other);

    let shared = a.adapt_owned(Arc::new(Point { x: 1, y: 2 }));
    let some = a.adapt_owned(Some(Point { x: 1, y: 2 }));
    assert_eq!(boxed, shared);
    assert_eq!(shared, some);
    assert_eq!(some, boxed);
    assert_ne!(shared, a.adapt_owned(Box::new(Point { x: 1, y: 3 })));

    // Only one level is removed from each side.
    let nested = a.adapt_owned(Box::new(Box::new(Point { x: 1, y: 2 })));
    assert_ne!(nested, direct);
    assert_eq!(nested, a.adapt_owned(Arc::new(Box::new(Point { x: 1, y: 2 }))));
}

#[test]
fn test_convert_to_native() {
    let a = adapter();
    let value = a.adapt_owned(Point { x: 3, y: 4 });

    let point = a.convert_to_native(&value, &Point::host_type()).unwrap();
    assert_eq!(point.downcast::<Point>().unwrap(), Point { x: 3, y: 4 });

    let boxed = a
        .convert_to_native(&value, &Box::<Point>::host_type())
        .unwrap();
    assert_eq!(
        boxed.downcast::<Box<Point>>().unwrap(),
        Box::new(Point { x: 3, y: 4 })
    );

    let same = a.convert_to_native(&value, &Value::host_type()).unwrap();
    assert!(same.is::<Value>());

    assert!(matches!(
        a.convert_to_native(&Value::Int(1), &Point::host_type()),
        Err(EvalError::Conversion { .. })
    ));
}

#[test]
fn test_index_reads_fields() {
    let a = adapter();
    let value = a.adapt_owned(Point { x: 7, y: 8 });
    let indexer = value.as_object().unwrap().as_indexer().unwrap();
    assert_eq!(indexer.get(&Value::string("y")), Value::Int(8));
    assert!(matches!(
        indexer.get(&Value::Int(0)).as_error(),
        Some(EvalError::NoSuchOverload { .. })
    ));
}

//! Benchmark: host function dispatch
//!
//! Compares the cost of calling a host function:
//! 1. Directly, as a baseline
//! 2. Through the overload binding built at registration
//! 3. Through a checked program, including overload selection
//!
//! Run with: `cargo bench --bench function_dispatch`

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hostbind_core::Native;
use hostbind_core::api::{Env, MapActivation};
use hostbind_core::bridge::{Registry, RegistryOptions};
use hostbind_core::syntax::Expr;
use hostbind_core::values::Value;
use std::sync::Arc;

#[derive(Clone, Native)]
pub struct Order {
    #[native(json = "qty")]
    pub qty: i64,
    #[native(json = "price")]
    pub price: i64,
}

fn add(a: i64, b: i64) -> i64 {
    a.wrapping_add(b)
}

fn registry() -> Arc<Registry> {
    let mut registry = Registry::new(RegistryOptions::default().with_tag_name("json"));
    registry
        .register_function("add", add)
        .expect("add registers");
    registry
        .register_function("concat", |a: String, b: String| a + &b)
        .expect("concat registers");
    registry
        .register("order", Order { qty: 3, price: 250 })
        .expect("order registers");
    Arc::new(registry)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_direct_call(c: &mut Criterion) {
    c.bench_function("direct_call", |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0i64..1000 {
                sum = add(black_box(sum), black_box(i));
            }
            sum
        })
    });
}

fn bench_binding(c: &mut Criterion) {
    let registry = registry();
    let binding = registry.overloads("add")[0].binding.clone();

    c.bench_function("binding_invoke", |b| {
        b.iter(|| {
            let mut sum = Value::Int(0);
            for i in 0i64..1000 {
                sum = binding.invoke(&[black_box(sum), black_box(Value::Int(i))]);
            }
            sum
        })
    });
}

fn bench_program(c: &mut Criterion) {
    let registry = registry();
    let env = Env::new(registry.compile_options());

    let call = env
        .compile(&Expr::call("add", vec![Expr::ident("x"), Expr::int(1)]))
        .expect("call compiles");
    let activation = MapActivation::new().with("x", Value::Int(41));
    c.bench_function("program_call", |b| {
        b.iter(|| call.eval(black_box(&activation)))
    });

    // Field reads go through the struct's field index on every evaluation.
    let fields = env
        .compile(&Expr::mul(
            Expr::ident("order").field("qty"),
            Expr::ident("order").field("price"),
        ))
        .expect("fields compile");
    c.bench_function("program_fields", |b| b.iter(|| fields.eval_empty()));

    let strings = env
        .compile(&Expr::call(
            "concat",
            vec![Expr::string("foo"), Expr::string("bar")],
        ))
        .expect("concat compiles");
    c.bench_function("program_concat", |b| b.iter(|| strings.eval_empty()));
}

criterion_group!(benches, bench_direct_call, bench_binding, bench_program);
criterion_main!(benches);

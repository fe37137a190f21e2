//! Hot-path benchmark: repeated gets through the accessor cache
//!
//! Exercises both tiers: the first iterations run reflective, later
//! ones run on the promoted specialized closures.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use keypath_core::{ClassDef, Value};
use keypath_engine::Engine;

fn build_engine() -> (Engine, Value) {
    let engine = Engine::new();
    engine
        .register_class(ClassDef::new("bench.Address").field("city", "string").build())
        .unwrap();
    engine
        .register_class(
            ClassDef::new("bench.Person")
                .field("name", "string")
                .field("address", "bench.Address")
                .build(),
        )
        .unwrap();

    let address = engine.instantiate("bench.Address").unwrap();
    engine.set_field(&address, "city", Value::str("Paris")).unwrap();
    let person = engine.instantiate("bench.Person").unwrap();
    engine.set_field(&person, "name", Value::str("Ada")).unwrap();
    engine.set_field(&person, "address", address).unwrap();
    (engine, person)
}

fn bench_object_path_get(c: &mut Criterion) {
    let (engine, person) = build_engine();
    let path = engine.parse_path("address.city").unwrap();

    c.bench_function("object_path_get", |b| {
        b.iter(|| {
            let value = engine.get_path(black_box(&person), &path).unwrap();
            black_box(value)
        })
    });
}

fn bench_map_path_get(c: &mut Criterion) {
    let engine = Engine::new();
    let receiver = Value::map_of([("address", Value::map_of([("city", Value::str("Paris"))]))]);
    let path = engine.parse_path("address.city").unwrap();

    c.bench_function("map_path_get", |b| {
        b.iter(|| {
            let value = engine.get_path(black_box(&receiver), &path).unwrap();
            black_box(value)
        })
    });
}

criterion_group!(benches, bench_object_path_get, bench_map_path_get);
criterion_main!(benches);

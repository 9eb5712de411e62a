//! Benchmark expression parsing and evaluation time.

use criterion::{criterion_group, criterion_main, Criterion};

use benches::{context, EXPRESSIONS};
use stexpr::{Engine, ExecutionMode, ValueContext};

criterion_main! { benches }
criterion_group! { benches, bench_init, bench_parse, bench_parse_cached, bench_evaluate }

/// Benchmarks the time taken to create a new instance of the engine.
fn bench_init(c: &mut Criterion) {
    c.bench_function("init", |b| b.iter(Engine::new));
}

/// Benchmarks the time taken to parse an expression without a cache.
fn bench_parse(c: &mut Criterion) {
    let mut g = c.benchmark_group("parse");
    let engine = Engine::without_cache();
    for (name, source) in EXPRESSIONS {
        g.bench_function(*name, |b| b.iter(|| engine.parse(source).unwrap()));
    }
}

/// Benchmarks the time taken to fetch an already parsed expression.
fn bench_parse_cached(c: &mut Criterion) {
    let mut g = c.benchmark_group("parse_cached");
    let engine = Engine::new();
    for (name, source) in EXPRESSIONS {
        engine.parse(source).unwrap();
        g.bench_function(*name, |b| b.iter(|| engine.parse(source).unwrap()));
    }
}

/// Benchmarks the time taken to evaluate a parsed expression.
fn bench_evaluate(c: &mut Criterion) {
    let mut g = c.benchmark_group("evaluate");
    let ctx = ValueContext::from_serialize(context::random(150)).unwrap();
    let engine = Engine::new();
    for (name, source) in EXPRESSIONS {
        let expr = engine.parse(source).unwrap();
        g.bench_function(*name, |b| {
            b.iter(|| engine.evaluate(&expr, &ctx, ExecutionMode::Normal).unwrap())
        });
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use stexpr::ast::Expression;
use stexpr::{value, Engine, ExecutionMode, ExpressionCache, StandardCache, Value, ValueContext};

#[derive(Default)]
struct Counting {
    map: Mutex<HashMap<String, Arc<Expression>>>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl ExpressionCache for &Counting {
    fn get(&self, key: &str) -> Option<Arc<Expression>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.map.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, expr: Arc<Expression>) {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.map.lock().unwrap().insert(key.to_owned(), expr);
    }
}

#[test]
fn cache_hit_returns_same_tree() {
    let engine = Engine::new();
    let a = engine.parse("${a} + 1").unwrap();
    let b = engine.parse("  ${a} + 1 ").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn cache_disabled_parses_every_time() {
    let engine = Engine::without_cache();
    let a = engine.parse("${a} + 1").unwrap();
    let b = engine.parse("${a} + 1").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a, b);
}

#[test]
fn cache_keyed_by_trimmed_input() {
    let cache = Counting::default();
    let engine = Engine::with_cache(&cache);
    engine.parse(" 1 + 2 ").unwrap();
    engine.parse("1 + 2").unwrap();
    assert_eq!(cache.gets.load(Ordering::SeqCst), 2);
    assert_eq!(cache.puts.load(Ordering::SeqCst), 1);
    assert!(cache.map.lock().unwrap().contains_key("1 + 2"));
}

#[test]
fn cache_failed_parse_not_stored() {
    let cache = Counting::default();
    let engine = Engine::with_cache(&cache);
    engine.parse("1 +").unwrap_err();
    engine.parse("1 +").unwrap_err();
    assert_eq!(cache.puts.load(Ordering::SeqCst), 0);
    assert!(cache.map.lock().unwrap().is_empty());
}

#[test]
fn cache_coherence() {
    let cache = StandardCache::new(1);
    let engine = Engine::with_cache(cache);
    let ctx = ValueContext::new(value!({ a: 2 }));
    let inputs = ["${a} * 3", "${a} + 1", "${a} * 3"];
    let mut results = Vec::new();
    for input in inputs {
        results.push(engine.eval(input, &ctx, ExecutionMode::Normal).unwrap());
    }
    assert_eq!(results, [Value::from(6), Value::from(3), Value::from(6)]);
}

#[test]
fn cache_concurrent() {
    let engine = Engine::with_cache(StandardCache::new(4));
    let inputs = ["${n} + 1", "${n} * 2", "${n} - 1", "${n} ?: 0", "-${n}", "${n} % 3"];
    thread::scope(|s| {
        for t in 0..8 {
            let engine = &engine;
            s.spawn(move || {
                for i in 0..50 {
                    let input = inputs[(t + i) % inputs.len()];
                    let ctx = ValueContext::new(value!({ n: 10 }));
                    let result = engine.eval(input, &ctx, ExecutionMode::Normal).unwrap();
                    let expected = match input {
                        "${n} + 1" => 11,
                        "${n} * 2" => 20,
                        "${n} - 1" => 9,
                        "${n} ?: 0" => 10,
                        "-${n}" => -10,
                        _ => 1,
                    };
                    assert_eq!(result, Value::from(expected), "{input}");
                }
            });
        }
    });
}

#[test]
fn cache_shared_tree_across_threads() {
    let engine = Engine::new();
    let expr = engine.parse("${greeting} + ', ' + ${name}").unwrap();
    thread::scope(|s| {
        for name in ["John", "Jane", "Jim"] {
            let expr = Arc::clone(&expr);
            let engine = &engine;
            s.spawn(move || {
                let ctx = ValueContext::new(value!({ greeting: "Hello", name: name }));
                let result = engine.evaluate(&expr, &ctx, ExecutionMode::Normal).unwrap();
                assert_eq!(result, Value::from(format!("Hello, {name}")));
            });
        }
    });
}

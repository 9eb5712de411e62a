#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

use stexpr::{Engine, ExecutionMode, ValueContext};

#[derive(Debug, Serialize, Arbitrary)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

#[derive(Debug, Arbitrary)]
enum Mode {
    Normal,
    Restricted,
    Unescaped,
}

fuzz_target!(|data: (&str, BTreeMap<String, Value>, Mode)| {
    let (source, root, mode) = data;
    let mode = match mode {
        Mode::Normal => ExecutionMode::Normal,
        Mode::Restricted => ExecutionMode::Restricted,
        Mode::Unescaped => ExecutionMode::Unescaped,
    };
    let ctx = match ValueContext::from_serialize(&root) {
        Ok(ctx) => ctx.with_messages(|key: &str, args: &[stexpr::Value]| {
            Some(format!("{key}{args:?}"))
        }),
        // Non-finite floats are rejected.
        Err(_) => return,
    };
    let _ = Engine::without_cache().eval(source, &ctx, mode);
});

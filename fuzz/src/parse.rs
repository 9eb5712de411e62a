#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(expr) = stexpr::parse(data) {
        let rendered = expr.to_string();
        let reparsed = stexpr::parse(&rendered).unwrap();
        assert_eq!(expr, reparsed, "{data:?} rendered as {rendered:?}");
    }
});

/// Construct a [`Value`][crate::Value] using a JSON-like syntax.
///
/// Map keys are identifiers, `null` is [`Value::None`][crate::Value::None]
/// and anything else goes through `Value::from`.
///
/// ```
/// let ctx = stexpr::value!({ user: { name: "John", age: 42, roles: ["admin", null] } });
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::None
    };
    ([ $($tt:tt)* ]) => {
        $crate::Value::List($crate::_value_seq!([] () $($tt)*))
    };
    ({ $($tt:tt)* }) => {
        $crate::Value::Map($crate::_value_map!([] $($tt)*))
    };
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

// Collects list elements. The tokens of the current element are gathered in
// the parenthesized group until a top level comma.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_seq {
    ([$($done:expr,)*] ()) => {
        ::std::vec![$($done,)*]
    };
    ([$($done:expr,)*] ($($cur:tt)+)) => {
        ::std::vec![$($done,)* $crate::value!($($cur)+)]
    };
    ([$($done:expr,)*] ($($cur:tt)+) , $($rest:tt)*) => {
        $crate::_value_seq!([$($done,)* $crate::value!($($cur)+),] () $($rest)*)
    };
    ([$($done:expr,)*] ($($cur:tt)*) $next:tt $($rest:tt)*) => {
        $crate::_value_seq!([$($done,)*] ($($cur)* $next) $($rest)*)
    };
}

// Collects map entries as `(key, value)` pairs, then inserts them all.
#[macro_export]
#[doc(hidden)]
macro_rules! _value_map {
    ([$(($key:ident, $value:expr))*]) => {{
        #[allow(unused_mut)]
        let mut map = $crate::Map::new();
        $(
            map.insert(::std::string::String::from(stringify!($key)), $value);
        )*
        map
    }};
    ([$($done:tt)*] $key:ident : $($rest:tt)*) => {
        $crate::_value_map!([$($done)*] $key () $($rest)*)
    };
    ([$($done:tt)*] $key:ident ($($cur:tt)+) , $($rest:tt)*) => {
        $crate::_value_map!([$($done)* ($key, $crate::value!($($cur)+))] $($rest)*)
    };
    ([$($done:tt)*] $key:ident ($($cur:tt)+)) => {
        $crate::_value_map!([$($done)* ($key, $crate::value!($($cur)+))])
    };
    ([$($done:tt)*] $key:ident ($($cur:tt)*) $next:tt $($rest:tt)*) => {
        $crate::_value_map!([$($done)*] $key ($($cur)* $next) $($rest)*)
    };
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use crate::{List, Map, Value};

    #[test]
    fn value_scalars() {
        assert_eq!(value!(null), Value::None);
        assert_eq!(value!("testing..."), Value::from("testing..."));
        assert_eq!(value!(2.5), Value::Number("2.5".parse().unwrap()));
        assert_eq!(value!(-7), Value::Number(BigDecimal::from(-7)));
        assert_eq!(value!('x'), Value::Char('x'));
    }

    #[test]
    fn value_list() {
        let v = value!(["testing...", null, {}, [], 1 + 2]);
        assert_eq!(
            v,
            Value::List(vec![
                Value::from("testing..."),
                Value::None,
                Value::Map(Map::new()),
                Value::List(List::new()),
                Value::from(3),
            ])
        );
        assert_eq!(value!([1, 2,]), Value::from([1, 2]));
    }

    #[test]
    fn value_map() {
        let v = value!({ x: "hello", });
        assert_eq!(v, Value::from([("x", "hello")]));

        let name = String::from("world!");
        let v = value!({ x: 1 * 2, y: name, z: null });
        let exp = Value::from([
            ("x", Value::from(2)),
            ("y", Value::from("world!")),
            ("z", Value::None),
        ]);
        assert_eq!(v, exp);
    }

    #[test]
    fn value_map_nested() {
        let v = value!({
            w: "hello",
            x: {
                y: ["a", { z: true }],
            },
        });
        let exp = Value::from([
            ("w", Value::from("hello")),
            (
                "x",
                Value::from([(
                    "y",
                    Value::List(vec![Value::from("a"), Value::from([("z", true)])]),
                )]),
            ),
        ]);
        assert_eq!(v, exp);
    }
}

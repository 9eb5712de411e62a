//! Path navigation used by [`ValueContext`][crate::ValueContext].

use crate::Value;

#[cfg_attr(test, derive(Debug, PartialEq))]
enum Segment<'p> {
    Key(&'p str),
    Index(usize),
}

/// Index the value with the given path, e.g. `users[0].name` or
/// `labels['x-y']`. Returns `None` if any segment is missing or the path is
/// not a plain path.
pub fn path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path.trim())?
        .into_iter()
        .try_fold(value, lookup)
}

/// Index into the value with the given path segment.
fn lookup<'a>(value: &'a Value, segment: Segment<'_>) -> Option<&'a Value> {
    match (value, segment) {
        (Value::List(list), Segment::Index(i)) => list.get(i),
        (Value::List(list), Segment::Key(key)) => list.get(key.parse::<usize>().ok()?),
        (Value::Map(map), Segment::Key(key)) => map.get(key),
        (Value::Map(map), Segment::Index(i)) => map.get(&i.to_string()),
        _ => None,
    }
}

fn segments(path: &str) -> Option<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = path;
    let mut expect_key = true;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix('[') {
            let end = tail.find(']')?;
            let inner = tail[..end].trim();
            let segment = match inner
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
            {
                Some(key) => Segment::Key(key),
                None => Segment::Index(inner.parse().ok()?),
            };
            segments.push(segment);
            rest = &tail[end + 1..];
            expect_key = false;
        } else if let Some(tail) = rest.strip_prefix('.') {
            if expect_key {
                return None;
            }
            rest = tail;
            expect_key = true;
        } else {
            if !expect_key {
                return None;
            }
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            let key = &rest[..end];
            if !key.chars().all(is_key_char) {
                return None;
            }
            segments.push(Segment::Key(key));
            rest = &rest[end..];
            expect_key = false;
        }
    }
    if expect_key {
        return None;
    }
    Some(segments)
}

fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '$' | '#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value;

    #[test]
    fn segments_parse() {
        assert_eq!(
            segments("a.b[0]['x-y'].c"),
            Some(vec![
                Segment::Key("a"),
                Segment::Key("b"),
                Segment::Index(0),
                Segment::Key("x-y"),
                Segment::Key("c"),
            ])
        );
    }

    #[test]
    fn segments_reject() {
        assert_eq!(segments(""), None);
        assert_eq!(segments("a."), None);
        assert_eq!(segments(".a"), None);
        assert_eq!(segments("a..b"), None);
        assert_eq!(segments("a + b"), None);
        assert_eq!(segments("a[x]"), None);
        assert_eq!(segments("a[0"), None);
    }

    #[test]
    fn path_lookup() {
        let v = value!({ users: [{ name: "John" }], flags: { dark: true } });
        assert_eq!(path(&v, "users[0].name"), Some(&Value::from("John")));
        assert_eq!(path(&v, "users.0.name"), Some(&Value::from("John")));
        assert_eq!(path(&v, "flags['dark']"), Some(&Value::Bool(true)));
        assert_eq!(path(&v, "users[1]"), None);
        assert_eq!(path(&v, "missing.name"), None);

        let m = Value::from([("1", true)]);
        assert_eq!(path(&m, "[1]"), Some(&Value::Bool(true)));
    }
}

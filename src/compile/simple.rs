//! Parsing of `X{...}` blocks: variables, selections, message, link and
//! fragment references, along with the parameter lists they carry.

use crate::compile::{self, lex};
use crate::types::ast::{Assignation, Expression, Fragment, Link, Message, Variable};

/// Parses a complete block such as `${user.name}` or `#{greeting(${name})}`.
/// Expressions inside the block are parsed at the given nesting `depth`.
pub fn parse(block: &str, depth: usize) -> Option<Expression> {
    let selector = block.chars().next()?;
    let inner = block
        .get(1..)?
        .strip_prefix('{')?
        .strip_suffix('}')?
        .trim();
    match selector {
        '$' => variable(inner).map(Expression::Variable),
        '*' => variable(inner).map(Expression::Selection),
        '#' => message(inner, depth).map(Expression::Message),
        '@' => link(inner, depth).map(Expression::Link),
        '~' => fragment(inner, depth).map(Expression::Fragment),
        _ => None,
    }
}

fn variable(inner: &str) -> Option<Variable> {
    if inner.is_empty() {
        return None;
    }
    Some(Variable {
        expression: inner.to_owned(),
    })
}

fn message(inner: &str, depth: usize) -> Option<Message> {
    if inner.is_empty() {
        return None;
    }
    let (base, params) = split_parameters(inner)?;
    let key = if lex::is_token(base) {
        Expression::Text(base.to_owned())
    } else {
        compile::expression(base, depth)?
    };
    let args = match params {
        Some(params) => sequence(params, depth)?,
        None => Vec::new(),
    };
    Some(Message {
        key: Box::new(key),
        args,
    })
}

fn link(inner: &str, depth: usize) -> Option<Link> {
    if inner.is_empty() {
        return None;
    }
    let (base, params) = split_parameters(inner)?;
    let base = text_or_expression(base, depth)?;
    let params = match params {
        Some(params) => assignations(params, depth)?,
        None => Vec::new(),
    };
    Some(Link {
        base: Box::new(base),
        params,
    })
}

fn fragment(inner: &str, depth: usize) -> Option<Fragment> {
    if inner.is_empty() {
        return Some(Fragment {
            template: None,
            selector: None,
            params: Vec::new(),
        });
    }
    let (target, params) = split_parameters(inner)?;
    let (template, selector) = match find_top_level(target, "::") {
        Some(i) => {
            let selector = target[i + 2..].trim();
            if selector.is_empty() {
                return None;
            }
            (&target[..i], Some(selector))
        }
        None => (target, None),
    };
    let template = match template.trim() {
        "" if selector.is_none() => return None,
        "" | "this" => None,
        template => Some(Box::new(text_or_expression(template, depth)?)),
    };
    let selector = match selector {
        Some(selector) => Some(Box::new(text_or_expression(selector, depth)?)),
        None => None,
    };
    let params = match params {
        Some(params) => assignations(params, depth)?,
        None => Vec::new(),
    };
    Some(Fragment {
        template,
        selector,
        params,
    })
}

/// Names in links and fragments are literal text unless they contain
/// something that only makes sense in an expression.
fn text_or_expression(text: &str, depth: usize) -> Option<Expression> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let is_expression = text.starts_with('(')
        || text.contains(['\'', '|'])
        || lex::SELECTORS
            .iter()
            .any(|s| text.contains(&format!("{s}{{")));
    if is_expression {
        compile::expression(text, depth)
    } else {
        Some(Expression::Text(text.to_owned()))
    }
}

/// Splits `base(params)` into its base and parameter text.
///
/// Only a trailing parenthesized group counts. If that group spans the
/// whole input then it is part of the base, e.g. `(${a} + 'x')`.
fn split_parameters(text: &str) -> Option<(&str, Option<&str>)> {
    let text = text.trim();
    if !text.ends_with(')') {
        return Some((text, None));
    }
    let mut depth = 0usize;
    let mut in_literal = false;
    for (i, c) in text.char_indices().rev() {
        match c {
            '\'' if !lex::is_escaped(text, i) => in_literal = !in_literal,
            _ if in_literal => {}
            ')' => depth += 1,
            '(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    if i == 0 {
                        return Some((text, None));
                    }
                    let base = text[..i].trim();
                    if base.is_empty() {
                        return None;
                    }
                    return Some((base, Some(&text[i + 1..text.len() - 1])));
                }
            }
            _ => {}
        }
    }
    None
}

/// Finds `pat` outside of literals, parentheses and braces.
fn find_top_level(text: &str, pat: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_literal = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' if !lex::is_escaped(text, i) => in_literal = !in_literal,
            _ if in_literal => {}
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 && text[i..].starts_with(pat) => return Some(i),
            _ => {}
        }
    }
    None
}

/// Splits on top level commas.
fn split_top_level(text: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_literal = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '\'' if !lex::is_escaped(text, i) => in_literal = !in_literal,
            _ if in_literal => {}
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_literal || depth > 0 {
        return None;
    }
    parts.push(text[start..].trim());
    Some(parts)
}

/// Parses a comma separated list of expressions.
fn sequence(text: &str, depth: usize) -> Option<Vec<Expression>> {
    if text.trim().is_empty() {
        return Some(Vec::new());
    }
    split_top_level(text)?
        .into_iter()
        .map(|part| {
            if part.is_empty() {
                None
            } else {
                compile::expression(part, depth)
            }
        })
        .collect()
}

/// Parses a comma separated list of `name=value` or `name` items.
fn assignations(text: &str, depth: usize) -> Option<Vec<Assignation>> {
    if text.trim().is_empty() {
        return Some(Vec::new());
    }
    split_top_level(text)?
        .into_iter()
        .map(|part| assignation(part, depth))
        .collect()
}

fn assignation(part: &str, depth: usize) -> Option<Assignation> {
    if part.is_empty() {
        return None;
    }
    match find_assign(part) {
        Some(i) => {
            let (name, value) = (part[..i].trim(), part[i + 1..].trim());
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(Assignation {
                name: compile::expression(name, depth)?,
                value: Some(compile::expression(value, depth)?),
            })
        }
        None => Some(Assignation {
            name: compile::expression(part, depth)?,
            value: None,
        }),
    }
}

/// Finds the first top level `=` that is not part of a comparison operator.
fn find_assign(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_literal = false;
    for (i, c) in text.char_indices() {
        match c {
            '\'' if !lex::is_escaped(text, i) => in_literal = !in_literal,
            _ if in_literal => {}
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            '=' if depth == 0 => {
                let before = i.checked_sub(1).map(|j| bytes[j]);
                let after = bytes.get(i + 1).copied();
                let comparison = matches!(before, Some(b'=' | b'!' | b'<' | b'>'))
                    || after == Some(b'=');
                if !comparison {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_parameters_trailing_group() {
        assert_eq!(split_parameters("a.b"), Some(("a.b", None)));
        assert_eq!(
            split_parameters("greeting(${name}, 'x)')"),
            Some(("greeting", Some("${name}, 'x)'")))
        );
        assert_eq!(
            split_parameters("(${a} + 'b')"),
            Some(("(${a} + 'b')", None))
        );
        assert_eq!(split_parameters("a)"), None);
    }

    #[test]
    fn split_top_level_commas() {
        assert_eq!(
            split_top_level("a, f(b, c), 'd,e'"),
            Some(vec!["a", "f(b, c)", "'d,e'"])
        );
        assert_eq!(split_top_level("a, 'b"), None);
    }

    #[test]
    fn find_assign_skips_comparisons() {
        assert_eq!(find_assign("a=1"), Some(1));
        assert_eq!(find_assign("a == b"), None);
        assert_eq!(find_assign("x=(a >= b)"), Some(1));
        assert_eq!(find_assign("'a=b'"), None);
    }

    #[test]
    fn find_top_level_separator() {
        assert_eq!(find_top_level("a :: b", "::"), Some(2));
        assert_eq!(find_top_level("'a::b'", "::"), None);
        assert_eq!(find_top_level("${a::b}", "::"), None);
    }
}

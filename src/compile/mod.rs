//! Parse expression text into an [`Expression`] tree.
//!
//! This process has two stages:
//! - Decomposition extracts literals, tokens, `X{...}` blocks and
//!   parenthesized groups into an arena of nodes linked by placeholders.
//! - Composition resolves every node by trying each operator family in
//!   precedence order.

mod compose;
mod decompose;
mod lex;
mod operator;
mod simple;
mod state;

use crate::types::ast::Expression;
use crate::types::span::Span;
use crate::{Error, Result};

/// How deeply operators, parenthesized groups and references may nest.
///
/// Parsing recurses once per level, so deeper input is a syntax error rather
/// than a stack overflow.
pub const MAX_DEPTH: usize = 128;

/// Parse an expression, reporting a syntax error on failure.
pub fn parse(input: &str) -> Result<Expression> {
    let trimmed = input.trim();
    match expression(trimmed, 0) {
        Some(expr) => Ok(expr),
        None => {
            log::debug!("could not parse as expression: {trimmed:?}");
            Err(Error::syntax(trimmed, locate_error(trimmed)))
        }
    }
}

/// Parse an expression found at the given nesting `depth`. Nested
/// expressions inside references are parsed with this too.
pub fn expression(input: &str, depth: usize) -> Option<Expression> {
    if depth > MAX_DEPTH {
        return None;
    }
    let mut state = decompose::decompose(input, depth)?;
    compose::compose(&mut state, depth)?;
    state.into_root()
}

/// Points at the most likely culprit in an expression that failed to parse.
///
/// Structural problems like an unterminated literal or an unbalanced
/// parenthesis are located exactly, anything else covers the whole input.
fn locate_error(input: &str) -> Span {
    let mut parens = Vec::new();
    let mut literal: Option<usize> = None;
    let mut block: Option<(usize, usize)> = None;

    let mut iter = input.char_indices();
    while let Some((i, c)) = iter.next() {
        if let Some((start, depth)) = block {
            block = match c {
                '{' => Some((start, depth + 1)),
                '}' if depth == 1 => None,
                '}' => Some((start, depth - 1)),
                _ => block,
            };
            continue;
        }
        match c {
            '\'' if !lex::is_escaped(input, i) => {
                literal = match literal {
                    Some(_) => None,
                    None => Some(i),
                }
            }
            _ if literal.is_some() => {}
            c if lex::SELECTORS.contains(&c) && input[i + 1..].starts_with('{') => {
                iter.next();
                block = Some((i, 1));
            }
            '(' => parens.push(i),
            ')' => {
                if parens.pop().is_none() {
                    return Span::from(i..i + 1);
                }
            }
            _ => {}
        }
    }

    if let Some(start) = literal {
        return Span::from(start..input.len());
    }
    if let Some((start, _)) = block {
        return Span::from(start..input.len());
    }
    match parens.pop() {
        Some(i) => Span::from(i..i + 1),
        None => Span::of(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_unbalanced() {
        assert_eq!(locate_error("(1 + 2"), Span::from(0..1));
        assert_eq!(locate_error("1 + 2)"), Span::from(5..6));
        assert_eq!(locate_error("'(' + (1"), Span::from(6..7));
    }

    #[test]
    fn locate_unterminated() {
        assert_eq!(locate_error("1 + 'abc"), Span::from(4..8));
        assert_eq!(locate_error("1 + ${a{b}"), Span::from(4..10));
    }

    #[test]
    fn locate_fallback() {
        assert_eq!(locate_error("1 +"), Span::from(0..3));
    }
}

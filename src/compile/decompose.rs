//! Decomposition turns the raw expression text into a [`ParsingState`].
//!
//! It runs in three passes:
//!
//! 1. Literal substitution rewrites `|...|` sections into concatenations.
//! 2. Every text literal, `X{...}` block and token is parsed and moved into
//!    its own resolved node, leaving a placeholder behind.
//! 3. Parenthesized groups are moved into their own raw nodes, recursively.
//!
//! After this only operators, whitespace, parentheses and placeholders are
//! left in the raw text.

use std::borrow::Cow;
use std::mem;

use crate::compile::lex::{self, SELECTORS};
use crate::compile::state::{push_placeholder, ParsingState};
use crate::compile::{simple, MAX_DEPTH};

pub fn decompose(input: &str, depth: usize) -> Option<ParsingState> {
    let input = substitute_literals(input);
    let mut state = decompose_simple(&input, depth)?;
    decompose_nesting(&mut state, 0, depth)?;
    Some(state)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Nothing,
    Literal,
    Token,
    Block { depth: usize },
}

/// Extracts literals, `X{...}` blocks and tokens into resolved nodes.
fn decompose_simple(input: &str, depth: usize) -> Option<ParsingState> {
    let mut state = ParsingState::new();
    if input.trim().is_empty() {
        state.set_raw(0, input.to_owned());
        return Some(state);
    }

    let mut decomposed = String::with_capacity(input.len());
    let mut fragment = String::new();
    let mut scan = Scan::Nothing;

    let mut iter = input.char_indices();
    while let Some((i, c)) = iter.next() {
        if scan == Scan::Token && !lex::is_token_char(input, i) {
            finish_token(&mut state, &mut decomposed, &mut fragment);
            scan = Scan::Nothing;
        }

        match scan {
            Scan::Nothing if c == '\'' && !lex::is_escaped(input, i) => {
                decomposed.push_str(&mem::take(&mut fragment));
                fragment.push(c);
                scan = Scan::Literal;
            }
            Scan::Literal if c == '\'' && !lex::is_escaped(input, i) => {
                fragment.push(c);
                let expr = lex::parse_text_literal(&fragment)?;
                let index = state.push_resolved(expr);
                push_placeholder(&mut decomposed, index);
                fragment.clear();
                scan = Scan::Nothing;
            }
            Scan::Nothing if SELECTORS.contains(&c) && input[i + 1..].starts_with('{') => {
                decomposed.push_str(&mem::take(&mut fragment));
                fragment.push(c);
                fragment.push('{');
                iter.next();
                scan = Scan::Block { depth: 1 };
            }
            Scan::Block { depth } if c == '}' => {
                fragment.push(c);
                if depth == 1 {
                    let expr = simple::parse(&fragment, depth + 1)?;
                    let index = state.push_resolved(expr);
                    push_placeholder(&mut decomposed, index);
                    fragment.clear();
                    scan = Scan::Nothing;
                } else {
                    scan = Scan::Block { depth: depth - 1 };
                }
            }
            Scan::Block { depth } if c == '{' => {
                fragment.push(c);
                scan = Scan::Block { depth: depth + 1 };
            }
            Scan::Nothing if lex::is_token_char(input, i) => {
                decomposed.push_str(&mem::take(&mut fragment));
                fragment.push(c);
                scan = Scan::Token;
            }
            _ => fragment.push(c),
        }
    }

    match scan {
        Scan::Literal | Scan::Block { .. } => return None,
        Scan::Token => finish_token(&mut state, &mut decomposed, &mut fragment),
        Scan::Nothing => {}
    }
    decomposed.push_str(&fragment);
    state.set_raw(0, decomposed);
    Some(state)
}

/// Moves the token in `fragment` into its own node. Operator words and
/// anything that does not parse as a token stay in the text.
fn finish_token(state: &mut ParsingState, decomposed: &mut String, fragment: &mut String) {
    match lex::parse_token(fragment) {
        Some(expr) => {
            let index = state.push_resolved(expr);
            push_placeholder(decomposed, index);
        }
        None => decomposed.push_str(fragment),
    }
    fragment.clear();
}

/// Moves every top level parenthesized group in node `index` into a new raw
/// node and then does the same for each new node.
fn decompose_nesting(state: &mut ParsingState, index: usize, depth: usize) -> Option<()> {
    if depth > MAX_DEPTH {
        return None;
    }
    let input = match state.raw(index) {
        Some(raw) => raw.to_owned(),
        None => return Some(()),
    };

    let mut decomposed = String::with_capacity(input.len());
    let mut fragment = String::new();
    let mut nested = Vec::new();
    let mut depth = 0usize;

    for c in input.chars() {
        match c {
            '(' => {
                if depth == 0 {
                    decomposed.push_str(&mem::take(&mut fragment));
                } else {
                    fragment.push(c);
                }
                depth += 1;
            }
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    let child = state.push_raw(mem::take(&mut fragment));
                    push_placeholder(&mut decomposed, child);
                    nested.push(child);
                } else {
                    fragment.push(c);
                }
            }
            _ => fragment.push(c),
        }
    }
    if depth > 0 {
        return None;
    }
    decomposed.push_str(&fragment);
    state.set_raw(index, decomposed);

    for child in nested {
        decompose_nesting(state, child, depth + 1)?;
    }
    Some(())
}

////////////////////////////////////////////////////////////////////////////////
// Literal substitution
////////////////////////////////////////////////////////////////////////////////

/// Rewrites `|...|` sections into string concatenations.
///
/// `|Hello ${user.name}!|` becomes `'Hello ' + ${user.name} + '!'`.
pub fn substitute_literals(input: &str) -> Cow<'_, str> {
    if !input.contains('|') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    let mut in_substitution = false;
    let mut in_insertion = false;
    let mut in_literal = false;
    let mut in_nothing = true;
    let mut depth = 0usize;
    let mut prev = None;

    let mut iter = input.char_indices();
    while let Some((i, c)) = iter.next() {
        let is_block = c != '~' && SELECTORS.contains(&c) && input[i + 1..].starts_with('{');

        if c == '|' && in_nothing && !in_substitution {
            in_substitution = true;
        } else if c == '|' && in_nothing && in_substitution {
            if in_insertion {
                out.push('\'');
                in_insertion = false;
            }
            in_substitution = false;
        } else if in_nothing && is_block {
            if in_substitution && in_insertion {
                out.push_str("' + ");
                in_insertion = false;
            } else if in_substitution && prev == Some('}') {
                out.push_str(" + '' + ");
            }
            out.push(c);
            out.push('{');
            iter.next();
            depth = 1;
            in_nothing = false;
            prev = Some('{');
            continue;
        } else if depth == 1 && c == '}' {
            out.push(c);
            depth = 0;
            in_nothing = true;
        } else if depth > 0 {
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            out.push(c);
        } else if in_nothing && !in_substitution && c == '\'' && !lex::is_escaped(input, i) {
            in_nothing = false;
            in_literal = true;
            out.push(c);
        } else if in_literal && !in_substitution && c == '\'' && !lex::is_escaped(input, i) {
            in_literal = false;
            in_nothing = true;
            out.push(c);
        } else if in_substitution && in_nothing {
            if !in_insertion {
                if prev != Some('|') {
                    out.push_str(" + ");
                }
                out.push('\'');
                in_insertion = true;
            }
            if matches!(c, '\'' | '\\') {
                out.push('\\');
            }
            out.push(c);
        } else {
            out.push(c);
        }
        prev = Some(c);
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::state::Node;
    use crate::types::ast::{Expression, Variable};

    fn decompose_str(input: &str) -> Option<ParsingState> {
        decompose(input, 0)
    }

    fn raw(state: &ParsingState, index: usize) -> &str {
        state.raw(index).unwrap()
    }

    #[test]
    fn decompose_tokens_and_operators() {
        let state = decompose_str("1 + x * 2").unwrap();
        assert_eq!(raw(&state, 0), "§1§ + §2§ * §3§");
        assert_eq!(
            state.get(2),
            Some(&Node::Resolved(Expression::Token(String::from("x"))))
        );
    }

    #[test]
    fn decompose_keeps_operator_words() {
        let state = decompose_str("a and not b").unwrap();
        assert_eq!(raw(&state, 0), "§1§ and not §2§");
    }

    #[test]
    fn decompose_literals_and_blocks() {
        let state = decompose_str("'a (b' + ${x.y({1})}").unwrap();
        assert_eq!(raw(&state, 0), "§1§ + §2§");
        assert_eq!(
            state.get(1),
            Some(&Node::Resolved(Expression::Text(String::from("a (b"))))
        );
        assert_eq!(
            state.get(2),
            Some(&Node::Resolved(Expression::Variable(Variable {
                expression: String::from("x.y({1})")
            })))
        );
    }

    #[test]
    fn decompose_nested_parentheses() {
        let state = decompose_str("(1 + (2)) * 3").unwrap();
        assert_eq!(raw(&state, 0), "§4§ * §3§");
        assert_eq!(raw(&state, 4), "§1§ + §5§");
        assert_eq!(raw(&state, 5), "§2§");
    }

    #[test]
    fn decompose_unbalanced() {
        assert!(decompose_str("(1 + 2").is_none());
        assert!(decompose_str("1 + 2)").is_none());
        assert!(decompose_str(")(").is_none());
    }

    #[test]
    fn decompose_unterminated() {
        assert!(decompose_str("'abc").is_none());
        assert!(decompose_str(r"'abc\'").is_none());
        assert!(decompose_str("${abc").is_none());
        assert!(decompose_str("${a{b}").is_none());
    }

    #[test]
    fn decompose_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(decompose_str(&deep).is_some());
        let deeper = format!("({deep})");
        assert!(decompose_str(&deeper).is_none());
    }

    #[test]
    fn decompose_whitespace_only() {
        let state = decompose_str("   ").unwrap();
        assert_eq!(raw(&state, 0), "   ");
    }

    #[test]
    fn substitute_plain() {
        assert_eq!(substitute_literals("${a} + 1"), "${a} + 1");
        assert_eq!(substitute_literals("|Hello|"), "'Hello'");
    }

    #[test]
    fn substitute_with_expressions() {
        assert_eq!(
            substitute_literals("|Hello ${user.name}!|"),
            "'Hello ' + ${user.name} + '!'"
        );
        assert_eq!(
            substitute_literals("|${a}${b}|"),
            "${a} + '' + ${b}"
        );
        assert_eq!(
            substitute_literals("|${a} ${b}|"),
            "${a} + ' ' + ${b}"
        );
    }

    #[test]
    fn substitute_escapes_quotes() {
        assert_eq!(substitute_literals(r"|it's|"), r"'it\'s'");
    }

    #[test]
    fn substitute_skips_literals() {
        assert_eq!(substitute_literals("'a|b' + |c|"), "'a|b' + 'c'");
    }
}

//! Character classification shared by the decomposer and the reference
//! parsers.
//!
//! All positions are byte offsets that must lie on a character boundary.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::types::ast::Expression;

/// Words that are operators and therefore never extracted as tokens.
const PROTECTED_TOKENS: &[&str] = &[
    "and", "or", "not", "eq", "ne", "neq", "gt", "ge", "lt", "le", "div", "mod",
];

/// The characters that introduce a `X{...}` block.
pub const SELECTORS: &[char] = &['$', '*', '#', '@', '~'];

/// Returns whether the character at `pos` belongs to a bare token.
///
/// A `-` is only a token character inside an identifier-like run, i.e. when
/// an adjacent run of token characters contains something other than digits
/// and decimal points. Everywhere else it is the minus operator.
pub fn is_token_char(text: &str, pos: usize) -> bool {
    let c = match text[pos..].chars().next() {
        Some(c) => c,
        None => return false,
    };
    match c {
        '0'..='9' | 'A'..='Z' | 'a'..='z' | '[' | ']' | '.' | '_' | '\u{00B7}' => true,
        '-' => is_token_minus(text, pos),
        c if c.is_ascii() => false,
        c => is_token_unicode(c),
    }
}

fn is_token_minus(text: &str, pos: usize) -> bool {
    for (i, c) in text[..pos].char_indices().rev() {
        if !is_token_char(text, i) {
            break;
        }
        if !is_numeric(c) {
            return true;
        }
    }
    for (i, c) in text[pos + 1..].char_indices() {
        // A second minus right after this one joins the run. Any later minus
        // ends it, its own backward scan is the one that looks at us.
        if c == '-' {
            if i == 0 {
                return true;
            }
            break;
        }
        if !is_token_char(text, pos + 1 + i) {
            break;
        }
        if !is_numeric(c) {
            return true;
        }
    }
    false
}

fn is_numeric(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

#[cfg(feature = "unicode")]
fn is_token_unicode(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(not(feature = "unicode"))]
fn is_token_unicode(c: char) -> bool {
    matches!(c, '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{00FF}')
}

/// Returns whether the whole of `text` is a single token.
pub fn is_token(text: &str) -> bool {
    !text.is_empty() && text.char_indices().all(|(i, _)| is_token_char(text, i))
}

/// Returns whether the quote at byte `pos` is escaped, i.e. preceded by an odd
/// number of backslashes.
pub fn is_escaped(text: &str, pos: usize) -> bool {
    let backslashes = text.as_bytes()[..pos]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    backslashes % 2 == 1
}

/// Parses a token that has already been extracted from the input.
///
/// Returns `None` for operator words and anything that is not a token.
pub fn parse_token(token: &str) -> Option<Expression> {
    if PROTECTED_TOKENS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(token))
    {
        return None;
    }
    if let Some(number) = parse_number(token) {
        return Some(Expression::Number(number));
    }
    if token.eq_ignore_ascii_case("true") {
        return Some(Expression::Bool(true));
    }
    if token.eq_ignore_ascii_case("false") {
        return Some(Expression::Bool(false));
    }
    if token.eq_ignore_ascii_case("null") {
        return Some(Expression::Null);
    }
    is_token(token).then(|| Expression::Token(token.to_owned()))
}

/// Digits with at most one decimal point.
fn parse_number(token: &str) -> Option<BigDecimal> {
    let mut seen_point = false;
    let mut seen_digit = false;
    for c in token.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return None,
        }
    }
    if !seen_digit {
        return None;
    }
    BigDecimal::from_str(token).ok()
}

/// Parses a complete single quoted literal, including the quotes.
pub fn parse_text_literal(literal: &str) -> Option<Expression> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next == '\'' || next == '\\' => {
                text.push(next);
                chars.next();
            }
            _ => text.push(c),
        }
    }
    Some(Expression::Text(text))
}

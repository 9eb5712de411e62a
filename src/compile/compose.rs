//! Composition turns the raw nodes of a [`ParsingState`] into expressions.
//!
//! Each node is offered to a chain of composers, lowest precedence first.
//! A composer either leaves the node alone so the next one can try, resolves
//! it, or fails the whole parse.

use crate::compile::operator::{self, Family, Operator};
use crate::compile::state::{parse_placeholder, Node, ParsingState};
use crate::compile::MAX_DEPTH;
use crate::types::ast::{Conditional, Expression, Fallback, UnaryOp};

/// The outcome of a single composer.
enum Composed {
    /// The composer does not apply, try the next one.
    Skipped,
    Resolved,
    /// The text is malformed, abort the parse.
    Failed,
}

enum Step {
    Conditional,
    Default,
    Binary(&'static Family),
    Minus,
    Negation,
}

static CHAIN: &[Step] = &[
    Step::Conditional,
    Step::Default,
    Step::Binary(&operator::OR),
    Step::Binary(&operator::AND),
    Step::Binary(&operator::EQUALITY),
    Step::Binary(&operator::RELATIONAL),
    Step::Binary(&operator::ADDITIVE),
    Step::Binary(&operator::MULTIPLICATIVE),
    Step::Minus,
    Step::Negation,
];

/// Composes the root node of an expression found at the given nesting
/// `depth`.
pub fn compose(state: &mut ParsingState, depth: usize) -> Option<()> {
    compose_at(state, 0, depth)
}

fn compose_at(state: &mut ParsingState, index: usize, depth: usize) -> Option<()> {
    if depth > MAX_DEPTH {
        state.mark_too_deep();
        return None;
    }
    let input = match state.get(index)? {
        Node::Resolved(_) => return Some(()),
        Node::Raw(raw) => raw.clone(),
    };
    if input.trim().is_empty() {
        return None;
    }

    if let Some(referenced) = parse_placeholder(&input) {
        compose_at(state, referenced, depth + 1)?;
        let expr = state.resolved(referenced)?.clone();
        state.resolve(index, expr);
        return Some(());
    }

    for step in CHAIN {
        let composed = match step {
            Step::Conditional => compose_conditional(state, index, &input, depth + 1),
            Step::Default => compose_default(state, index, &input, depth + 1),
            Step::Binary(family) => compose_binary(state, index, &input, family, depth + 1),
            Step::Minus => compose_unary(state, index, &input, UnaryOp::Minus, depth + 1),
            Step::Negation => compose_unary(state, index, &input, UnaryOp::Not, depth + 1),
        };
        match composed {
            Composed::Skipped => continue,
            Composed::Resolved => return Some(()),
            Composed::Failed => return None,
        }
    }
    None
}

/// Composes `text`, reusing the referenced node if `text` is a single
/// placeholder.
fn parse_and_compose(state: &mut ParsingState, text: &str, depth: usize) -> Option<Expression> {
    let index = match parse_placeholder(text) {
        Some(index) => index,
        None => state.push_raw(text.to_owned()),
    };
    compose_at(state, index, depth)?;
    state.resolved(index).cloned()
}

fn compose_conditional(
    state: &mut ParsingState,
    index: usize,
    input: &str,
    depth: usize,
) -> Composed {
    let q = match input.find('?') {
        Some(q) => q,
        None => return Composed::Skipped,
    };
    let rest = &input[q + 1..];
    // `?:` is the default operator.
    if rest.starts_with(':') {
        return Composed::Skipped;
    }
    if rest.contains('?') {
        return Composed::Failed;
    }
    let (then_text, else_text) = match rest.find(':') {
        Some(c) if rest[c + 1..].contains(':') => return Composed::Failed,
        Some(c) => (&rest[..c], Some(&rest[c + 1..])),
        None => (rest, None),
    };

    let cond_text = input[..q].trim();
    let then_text = then_text.trim();
    if cond_text.is_empty() || then_text.is_empty() {
        return Composed::Failed;
    }
    let cond = match parse_and_compose(state, cond_text, depth) {
        Some(expr) => expr,
        None => return Composed::Failed,
    };
    let then_branch = match parse_and_compose(state, then_text, depth) {
        Some(expr) => expr,
        None => return Composed::Failed,
    };
    let else_branch = match else_text.map(str::trim) {
        Some("") => return Composed::Failed,
        Some(text) => match parse_and_compose(state, text, depth) {
            Some(expr) => Some(Box::new(expr)),
            None => return Composed::Failed,
        },
        None => None,
    };

    state.resolve(
        index,
        Expression::Conditional(Conditional {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch,
        }),
    );
    Composed::Resolved
}

fn compose_default(state: &mut ParsingState, index: usize, input: &str, depth: usize) -> Composed {
    let i = match input.find("?:") {
        Some(i) => i,
        None => return Composed::Skipped,
    };
    let primary_text = input[..i].trim();
    let fallback_text = input[i + 2..].trim();
    if primary_text.is_empty() || fallback_text.is_empty() || fallback_text.contains("?:") {
        return Composed::Failed;
    }
    let primary = match parse_and_compose(state, primary_text, depth) {
        Some(expr) => expr,
        None => return Composed::Failed,
    };
    let fallback = match parse_and_compose(state, fallback_text, depth) {
        Some(expr) => expr,
        None => return Composed::Failed,
    };
    state.resolve(
        index,
        Expression::Default(Fallback {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        }),
    );
    Composed::Resolved
}

fn compose_binary(
    state: &mut ParsingState,
    index: usize,
    input: &str,
    family: &Family,
    depth: usize,
) -> Composed {
    // ASCII lowercasing keeps byte offsets identical to `input`.
    let lowered = input.to_ascii_lowercase();
    let mut scanned = lowered.as_str();

    loop {
        let (pos, operator) = match rightmost_operator(scanned, family.operators) {
            Some(found) => found,
            None => return Composed::Skipped,
        };
        if let Some(expr) = compose_operation(state, input, pos, operator, family, depth) {
            state.resolve(index, expr);
            return Composed::Resolved;
        }
        if !operator.lenient || state.is_too_deep() {
            return Composed::Failed;
        }
        scanned = &scanned[..pos];
    }
}

/// Finds the operator that occurs last in `text`. When two operators end at
/// the same place the longer one wins, e.g. `>=` over `=` and `neq` over `eq`.
fn rightmost_operator<'a>(text: &str, operators: &'a [Operator]) -> Option<(usize, &'a Operator)> {
    let mut found: Option<(usize, &Operator)> = None;
    for operator in operators {
        let pos = match text.rfind(operator.token) {
            Some(pos) => pos,
            None => continue,
        };
        let end = pos + operator.token.len();
        let better = match found {
            None => true,
            Some((cur, cur_op)) => {
                let cur_end = cur + cur_op.token.len();
                cur_end < pos || (operator.token.len() > cur_op.token.len() && end >= cur_end)
            }
        };
        if better {
            found = Some((pos, operator));
        }
    }
    found
}

fn compose_operation(
    state: &mut ParsingState,
    input: &str,
    pos: usize,
    operator: &Operator,
    family: &Family,
    depth: usize,
) -> Option<Expression> {
    let left_text = input[..pos].trim();
    let right_text = input[pos + operator.token.len()..].trim();
    if left_text.is_empty() || right_text.is_empty() {
        return None;
    }
    let left = parse_and_compose(state, left_text, depth)?;
    if !(family.accepts_left)(&left) {
        return None;
    }
    let right = parse_and_compose(state, right_text, depth)?;
    if !(family.accepts_right)(&right) {
        return None;
    }
    Some(Expression::binary(operator.op, left, right))
}

fn compose_unary(
    state: &mut ParsingState,
    index: usize,
    input: &str,
    op: UnaryOp,
    depth: usize,
) -> Composed {
    let trimmed = input.trim();
    let operand = match op {
        // The operator must be the only one of its kind and come first,
        // anything else is subtraction.
        UnaryOp::Minus => match trimmed.rfind('-') {
            Some(0) => &trimmed[1..],
            _ => return Composed::Skipped,
        },
        UnaryOp::Not => {
            if let Some(rest) = trimmed.strip_prefix('!') {
                rest
            } else if trimmed.len() > 3
                && trimmed.get(..3).map_or(false, |w| w.eq_ignore_ascii_case("not"))
            {
                &trimmed[3..]
            } else {
                return Composed::Skipped;
            }
        }
    };
    let operand = operand.trim();
    if operand.is_empty() {
        return Composed::Failed;
    }
    match parse_and_compose(state, operand, depth) {
        Some(expr) => {
            state.resolve(index, Expression::unary(op, expr));
            Composed::Resolved
        }
        None => Composed::Failed,
    }
}

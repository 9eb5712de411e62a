//! Conversions applied to operands before an operator is executed.

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};

use crate::types::ast::BinaryOp;
use crate::{Error, Result, Value};

/// An intermediate result.
///
/// Text literals and text built by `+` stay distinct from other strings
/// because `+` never treats them as numbers, so `'1' + 2` is `"12"`. Every
/// other operator sees them as ordinary strings.
#[derive(Debug)]
pub enum Evaluated {
    Value(Value),
    Literal(String),
}

impl Evaluated {
    pub fn into_value(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Literal(text) => Value::String(text),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::Value(Value::None))
    }

    /// The number this operand stands for in an addition.
    fn addend(&self) -> Option<BigDecimal> {
        match self {
            Self::Value(value) => as_number(value),
            Self::Literal(_) => None,
        }
    }

    fn text(&self) -> String {
        match self {
            Self::Value(value) => value.to_string(),
            Self::Literal(text) => text.clone(),
        }
    }
}

/// Interprets a value as a condition.
pub fn as_bool(value: &Value) -> bool {
    match value {
        Value::None => false,
        Value::Bool(b) => *b,
        Value::Number(n) => !n.is_zero(),
        Value::Char(c) => *c != '\0',
        Value::String(s) => {
            let s = s.trim();
            !(s.eq_ignore_ascii_case("false")
                || s.eq_ignore_ascii_case("off")
                || s.eq_ignore_ascii_case("no"))
        }
        Value::List(_) | Value::Map(_) => true,
    }
}

/// Interprets a value as a number, if possible.
///
/// Strings qualify when they start with a digit or a sign and the rest parses
/// as a decimal, e.g. `"-4.5"` or `"1e3"`.
pub fn as_number(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<BigDecimal> {
    match s.chars().next()? {
        '0'..='9' | '-' => BigDecimal::from_str(s.trim()).ok(),
        '+' => BigDecimal::from_str(s[1..].trim_end()).ok(),
        _ => None,
    }
}

pub fn add(left: Evaluated, right: Evaluated) -> Evaluated {
    match (left.addend(), right.addend()) {
        (Some(l), Some(r)) => Evaluated::Value(Value::Number(l + r)),
        _ => {
            let mut text = left.text();
            text.push_str(&right.text());
            Evaluated::Literal(text)
        }
    }
}

/// Executes `-`, `*`, `/` or `%`, which require numeric operands.
pub fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    let (l, r) = match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(err_operands(op, left, right)),
    };
    let result = match op {
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div if r.is_zero() => return Err(err_division_by_zero(op)),
        BinaryOp::Div => divide(&l, &r),
        BinaryOp::Rem if r.is_zero() => return Err(err_division_by_zero(op)),
        BinaryOp::Rem => l % r,
        _ => return Err(err_operands(op, left, right)),
    };
    Ok(Value::Number(result))
}

/// Exact division when the quotient is exact, otherwise rounded half up to
/// at least ten decimal places.
fn divide(l: &BigDecimal, r: &BigDecimal) -> BigDecimal {
    let quotient = l / r;
    if &(&quotient * r) == l {
        return quotient;
    }
    let scale = [scale(l), scale(r), 10].into_iter().max().unwrap_or(10);
    quotient.with_scale_round(scale, bigdecimal::RoundingMode::HalfUp)
}

fn scale(n: &BigDecimal) -> i64 {
    n.as_bigint_and_exponent().1
}

pub fn negate(value: &Value) -> Result<Value> {
    match as_number(value) {
        Some(n) => Ok(Value::Number(-n)),
        None => Err(Error::evaluation(format!(
            "cannot execute minus: operand is \"{value}\""
        ))),
    }
}

/// `==` semantics. Never fails.
pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::None, right) => return right.is_none(),
        (_, Value::None) => return false,
        _ => {}
    }
    if let (Some(l), Some(r)) = (as_number(left), as_number(right)) {
        return l == r;
    }
    let (left, right) = (char_as_string(left), char_as_string(right));
    match ordering(&left, &right) {
        Some(ordering) => ordering == Ordering::Equal,
        None => left == right,
    }
}

/// `<`, `<=`, `>`, `>=` semantics. Fails for null operands and operands that
/// cannot be ordered against each other.
pub fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool> {
    if left.is_none() || right.is_none() {
        return Err(err_comparison(op, left, right));
    }
    let ordering = match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => l.cmp(&r),
        _ => ordering(&char_as_string(left), &char_as_string(right))
            .ok_or_else(|| err_comparison(op, left, right))?,
    };
    Ok(match op {
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        _ => return Err(err_comparison(op, left, right)),
    })
}

/// Orders values of the same orderable type.
fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
        (Value::Number(l), Value::Number(r)) => Some(l.cmp(r)),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

fn char_as_string(value: &Value) -> Value {
    match value {
        Value::Char(c) => Value::String(c.to_string()),
        value => value.clone(),
    }
}

fn err_operands(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::evaluation(format!(
        "cannot execute {}: operands are \"{left}\" and \"{right}\"",
        op.human()
    ))
}

fn err_comparison(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::evaluation(format!(
        "cannot execute {} comparison: operands are \"{left}\" ({}) and \"{right}\" ({})",
        op.human(),
        left.human(),
        right.human(),
    ))
}

fn err_division_by_zero(op: BinaryOp) -> Error {
    Error::evaluation(format!("cannot execute {}: division by zero", op.human()))
}

//! Static descriptors for the binary operator families.

use crate::types::ast::{BinaryOp, Expression};

pub struct Operator {
    /// The operator text in lowercase.
    pub token: &'static str,
    pub op: BinaryOp,
    /// Whether a failed split on this operator may be retried further left.
    ///
    /// Only `-` is lenient since the rightmost one may be a unary minus, as
    /// in `1 - -2`.
    pub lenient: bool,
}

pub struct Family {
    pub operators: &'static [Operator],
    pub accepts_left: fn(&Expression) -> bool,
    pub accepts_right: fn(&Expression) -> bool,
}

const fn strict(token: &'static str, op: BinaryOp) -> Operator {
    Operator {
        token,
        op,
        lenient: false,
    }
}

pub static OR: Family = Family {
    operators: &[strict("or", BinaryOp::Or)],
    accepts_left: any,
    accepts_right: any,
};

pub static AND: Family = Family {
    operators: &[strict("and", BinaryOp::And)],
    accepts_left: any,
    accepts_right: any,
};

pub static EQUALITY: Family = Family {
    operators: &[
        strict("==", BinaryOp::Eq),
        strict("!=", BinaryOp::Ne),
        strict("eq", BinaryOp::Eq),
        strict("ne", BinaryOp::Ne),
        strict("neq", BinaryOp::Ne),
    ],
    accepts_left: any,
    accepts_right: any,
};

pub static RELATIONAL: Family = Family {
    operators: &[
        strict(">", BinaryOp::Gt),
        strict(">=", BinaryOp::Ge),
        strict("<", BinaryOp::Lt),
        strict("<=", BinaryOp::Le),
        strict("gt", BinaryOp::Gt),
        strict("ge", BinaryOp::Ge),
        strict("lt", BinaryOp::Lt),
        strict("le", BinaryOp::Le),
    ],
    accepts_left: any,
    accepts_right: any,
};

pub static ADDITIVE: Family = Family {
    operators: &[
        strict("+", BinaryOp::Add),
        Operator {
            token: "-",
            op: BinaryOp::Sub,
            lenient: true,
        },
    ],
    accepts_left: additive_operand,
    accepts_right: additive_operand,
};

pub static MULTIPLICATIVE: Family = Family {
    operators: &[
        strict("*", BinaryOp::Mul),
        strict("/", BinaryOp::Div),
        strict("div", BinaryOp::Div),
        strict("%", BinaryOp::Rem),
        strict("mod", BinaryOp::Rem),
    ],
    accepts_left: multiplicative_operand,
    accepts_right: multiplicative_operand,
};

fn any(_: &Expression) -> bool {
    true
}

/// Booleans never take part in arithmetic or concatenation.
fn additive_operand(expr: &Expression) -> bool {
    !matches!(expr, Expression::Bool(_))
}

/// Text literals are also rejected since only `+` is defined for text.
fn multiplicative_operand(expr: &Expression) -> bool {
    !matches!(expr, Expression::Bool(_) | Expression::Text(_))
}

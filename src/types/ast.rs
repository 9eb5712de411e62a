//! The expression tree produced by the parser.
//!
//! Every node implements [`Display`][fmt::Display] which renders it back to
//! its canonical textual form. Parsing that text again yields an equal tree.

use std::fmt;

use bigdecimal::BigDecimal;

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A variable access, e.g. `${user.name}`.
    Variable(Variable),
    /// A selection variable access, e.g. `*{name}`.
    Selection(Variable),
    /// A quoted text literal, e.g. `'hello'`.
    Text(String),
    /// A number token, e.g. `3.14`.
    Number(BigDecimal),
    /// A boolean token, `true` or `false`.
    Bool(bool),
    /// The `null` token.
    Null,
    /// Any other bare token, e.g. `main-content`. Evaluates to its own text.
    Token(String),
    /// A message reference, e.g. `#{home.welcome(${user.name})}`.
    Message(Message),
    /// A link reference, e.g. `@{/order/details(id=${order.id})}`.
    Link(Link),
    /// A fragment reference, e.g. `~{footer :: copy}`.
    Fragment(Fragment),
    Binary(Binary),
    Unary(Unary),
    /// `cond ? then : else`, the else branch is optional.
    Conditional(Conditional),
    /// `primary ?: fallback`
    Default(Fallback),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// The text between the braces, trimmed.
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub key: Box<Expression>,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub base: Box<Expression>,
    pub params: Vec<Assignation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// The template name, `None` refers to the current template.
    pub template: Option<Box<Expression>>,
    pub selector: Option<Box<Expression>>,
    pub params: Vec<Assignation>,
}

/// A `name=value` pair in a link or fragment parameter list.
///
/// The value is optional: `@{/path(flag)}` and positional fragment arguments
/// only have a name.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignation {
    pub name: Expression,
    pub value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub cond: Box<Expression>,
    pub then_branch: Box<Expression>,
    pub else_branch: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    pub primary: Box<Expression>,
    pub fallback: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Minus,
    Not,
}

impl Expression {
    /// Whether this expression is an operation that needs parentheses when
    /// used as an operand.
    pub fn is_complex(&self) -> bool {
        matches!(
            self,
            Self::Binary(_) | Self::Unary(_) | Self::Conditional(_) | Self::Default(_)
        )
    }

    /// Whether this expression is a bare token, which includes the number,
    /// boolean and null tokens.
    pub fn is_token(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Bool(_) | Self::Null | Self::Token(_)
        )
    }

    pub(crate) fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Self::Binary(Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub(crate) fn unary(op: UnaryOp, operand: Expression) -> Self {
        Self::Unary(Unary {
            op,
            operand: Box::new(operand),
        })
    }
}

impl BinaryOp {
    /// The canonical operator text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }

    /// A human readable name used in error messages.
    pub fn human(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "equals",
            Self::Ne => "not equals",
            Self::Gt => "greater than",
            Self::Ge => "greater or equal to",
            Self::Lt => "less than",
            Self::Le => "less or equal to",
            Self::Add => "addition",
            Self::Sub => "subtraction",
            Self::Mul => "multiplication",
            Self::Div => "division",
            Self::Rem => "remainder",
        }
    }
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Not => "!",
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Canonical rendering
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => write!(f, "${{{}}}", v.expression),
            Self::Selection(v) => write!(f, "*{{{}}}", v.expression),
            Self::Text(text) => fmt_text(text, f),
            Self::Number(n) => f.write_str(&n.to_plain_string()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
            Self::Token(token) => f.write_str(token),
            Self::Message(message) => message.fmt(f),
            Self::Link(link) => link.fmt(f),
            Self::Fragment(fragment) => fragment.fmt(f),
            Self::Binary(binary) => binary.fmt(f),
            Self::Unary(unary) => unary.fmt(f),
            Self::Conditional(cond) => cond.fmt(f),
            Self::Default(default) => default.fmt(f),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#{")?;
        fmt_operand(&self.key, f)?;
        if !self.args.is_empty() {
            f.write_str("(")?;
            fmt_list(&self.args, f)?;
            f.write_str(")")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("@{")?;
        fmt_operand(&self.base, f)?;
        if !self.params.is_empty() {
            f.write_str("(")?;
            fmt_list(&self.params, f)?;
            f.write_str(")")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("~{")?;
        if let Some(template) = &self.template {
            fmt_operand(template, f)?;
        }
        if let Some(selector) = &self.selector {
            if self.template.is_some() {
                f.write_str(" ")?;
            }
            f.write_str(":: ")?;
            fmt_operand(selector, f)?;
        }
        if !self.params.is_empty() {
            f.write_str("(")?;
            fmt_list(&self.params, f)?;
            f.write_str(")")?;
        }
        f.write_str("}")
    }
}

impl fmt::Display for Assignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_operand(&self.name, f)?;
        if let Some(value) = &self.value {
            f.write_str("=")?;
            fmt_operand(value, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_operand(&self.left, f)?;
        write!(f, " {} ", self.op.as_str())?;
        fmt_operand(&self.right, f)
    }
}

impl fmt::Display for Unary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.as_str())?;
        fmt_operand(&self.operand, f)
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_operand(&self.cond, f)?;
        f.write_str(" ? ")?;
        fmt_operand(&self.then_branch, f)?;
        if let Some(else_branch) = &self.else_branch {
            f.write_str(" : ")?;
            fmt_operand(else_branch, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_operand(&self.primary, f)?;
        f.write_str(" ?: ")?;
        fmt_operand(&self.fallback, f)
    }
}

fn fmt_operand(expr: &Expression, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if expr.is_complex() {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn fmt_list<T: fmt::Display>(items: &[T], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn fmt_text(text: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("'")?;
    for c in text.chars() {
        if matches!(c, '\'' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("'")
}

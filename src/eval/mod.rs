//! Evaluate an [`Expression`] tree against a [`Context`].

mod coerce;
pub(crate) mod lookup;

use crate::context::{Context, ExecutionMode, LinkParameter};
use crate::eval::coerce::Evaluated;
use crate::types::ast::{
    Assignation, Binary, BinaryOp, Expression, Fragment, Link, Message, Unary, UnaryOp, Variable,
};
use crate::{Error, Result, Value};

/// Variables that [`ExecutionMode::Restricted`] and
/// [`ExecutionMode::Unescaped`] refuse to access by default.
pub const DEFAULT_RESTRICTED_VARIABLES: &[&str] = &[
    "param",
    "#request",
    "#response",
    "#session",
    "#servletContext",
];

pub struct Evaluator<'a, C: ?Sized> {
    ctx: &'a C,
    mode: ExecutionMode,
    restricted: &'a [&'a str],
}

impl<'a, C> Evaluator<'a, C>
where
    C: Context + ?Sized,
{
    pub fn new(ctx: &'a C, mode: ExecutionMode, restricted: &'a [&'a str]) -> Self {
        Self {
            ctx,
            mode,
            restricted,
        }
    }

    pub fn evaluate(&self, expr: &Expression) -> Result<Value> {
        self.eval(expr).map(Evaluated::into_value)
    }

    fn eval(&self, expr: &Expression) -> Result<Evaluated> {
        let value = match expr {
            Expression::Variable(var) => self.eval_variable(var, false)?,
            Expression::Selection(var) => self.eval_variable(var, true)?,
            Expression::Text(text) => return Ok(Evaluated::Literal(text.clone())),
            Expression::Number(n) => Value::Number(n.clone()),
            Expression::Bool(b) => Value::Bool(*b),
            Expression::Null => Value::None,
            Expression::Token(token) => Value::String(token.clone()),
            Expression::Message(message) => self.eval_message(message)?,
            Expression::Link(link) => self.eval_link(link)?,
            Expression::Fragment(fragment) => self.eval_fragment(fragment)?,
            Expression::Binary(binary) => return self.eval_binary(binary),
            Expression::Unary(unary) => self.eval_unary(unary)?,
            Expression::Conditional(cond) => {
                let branch = if coerce::as_bool(&self.evaluate(&cond.cond)?) {
                    Some(&cond.then_branch)
                } else {
                    cond.else_branch.as_ref()
                };
                return match branch {
                    Some(branch) => self.eval(branch),
                    None => Ok(Evaluated::Value(Value::None)),
                };
            }
            Expression::Default(default) => {
                let primary = self.eval(&default.primary)?;
                return if primary.is_none() {
                    self.eval(&default.fallback)
                } else {
                    Ok(primary)
                };
            }
        };
        Ok(Evaluated::Value(value))
    }

    fn eval_variable(&self, var: &Variable, selection: bool) -> Result<Value> {
        let expression = var.expression.as_str();
        if self.mode.restricts_variables() {
            let root = root_name(expression);
            if self.restricted.iter().any(|&name| name == root) {
                return Err(Error::evaluation(format!(
                    "access to variable \"{root}\" is forbidden in {} mode",
                    self.mode
                )));
            }
        }
        let value = if selection {
            log::trace!("resolving selection `*{{{expression}}}`");
            self.ctx.resolve_selection(expression)
        } else {
            log::trace!("resolving variable `${{{expression}}}`");
            self.ctx.resolve_variable(expression)
        };
        Ok(value.unwrap_or(Value::None))
    }

    fn eval_message(&self, message: &Message) -> Result<Value> {
        let resolver = self.ctx.message_resolver().ok_or_else(|| {
            Error::unsupported("message expressions require a context with message resolution")
        })?;
        let key = match self.evaluate(&message.key)? {
            Value::None => None,
            key => Some(key.to_string()),
        };
        let key = match key {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                return Err(Error::evaluation(
                    "message key must be a non-null and non-empty string",
                ))
            }
        };
        let args = message
            .args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>>>()?;
        log::trace!("resolving message `{key}` with {} arguments", args.len());
        Ok(resolver
            .resolve_message(&key, &args)
            .map_or(Value::None, Value::String))
    }

    fn eval_link(&self, link: &Link) -> Result<Value> {
        let builder = self.ctx.link_builder().ok_or_else(|| {
            Error::unsupported("link expressions require a context with link building")
        })?;
        let base = match self.evaluate(&link.base)? {
            Value::None => return Err(Error::evaluation("link base must not be null")),
            base => base.to_string(),
        };
        let params = link
            .params
            .iter()
            .map(|Assignation { name, value }| {
                Ok(LinkParameter {
                    name: self.evaluate(name)?.to_string(),
                    value: value.as_ref().map(|v| self.evaluate(v)).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::trace!("building link `{base}`");
        Ok(builder
            .build_link(&base, &params)
            .map_or(Value::None, Value::String))
    }

    fn eval_fragment(&self, fragment: &Fragment) -> Result<Value> {
        let resolver = self.ctx.fragment_resolver().ok_or_else(|| {
            Error::unsupported("fragment expressions require a context with fragment resolution")
        })?;
        let template = self.eval_name(fragment.template.as_deref())?;
        let selector = self.eval_name(fragment.selector.as_deref())?;
        let params = fragment
            .params
            .iter()
            .enumerate()
            .map(|(i, Assignation { name, value })| {
                Ok(match value {
                    Some(value) => (self.evaluate(name)?.to_string(), self.evaluate(value)?),
                    None => (format!("_arg{i}"), self.evaluate(name)?),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        log::trace!("resolving fragment {template:?} :: {selector:?}");
        Ok(resolver
            .resolve_fragment(template.as_deref(), selector.as_deref(), &params)
            .unwrap_or(Value::None))
    }

    fn eval_name(&self, expr: Option<&Expression>) -> Result<Option<String>> {
        match expr {
            Some(expr) => match self.evaluate(expr)? {
                Value::None => Ok(None),
                value => Ok(Some(value.to_string())),
            },
            None => Ok(None),
        }
    }

    fn eval_binary(&self, binary: &Binary) -> Result<Evaluated> {
        let Binary { op, left, right } = binary;
        let value = match op {
            BinaryOp::And => {
                coerce::as_bool(&self.evaluate(left)?) && coerce::as_bool(&self.evaluate(right)?)
            }
            BinaryOp::Or => {
                coerce::as_bool(&self.evaluate(left)?) || coerce::as_bool(&self.evaluate(right)?)
            }
            BinaryOp::Eq => coerce::equals(&self.evaluate(left)?, &self.evaluate(right)?),
            BinaryOp::Ne => !coerce::equals(&self.evaluate(left)?, &self.evaluate(right)?),
            BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Lt | BinaryOp::Le => {
                coerce::compare(*op, &self.evaluate(left)?, &self.evaluate(right)?)?
            }
            BinaryOp::Add => return Ok(coerce::add(self.eval(left)?, self.eval(right)?)),
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                let result = coerce::arithmetic(*op, &self.evaluate(left)?, &self.evaluate(right)?)?;
                return Ok(Evaluated::Value(result));
            }
        };
        Ok(Evaluated::Value(Value::Bool(value)))
    }

    fn eval_unary(&self, unary: &Unary) -> Result<Value> {
        let operand = self.evaluate(&unary.operand)?;
        match unary.op {
            UnaryOp::Minus => coerce::negate(&operand),
            UnaryOp::Not => Ok(Value::Bool(!coerce::as_bool(&operand))),
        }
    }
}

/// The name a variable expression starts with, e.g. `param` for
/// `param.id[0]`.
fn root_name(expression: &str) -> &str {
    let expression = expression.trim_start();
    let end = expression
        .char_indices()
        .find(|&(i, c)| !(c.is_alphanumeric() || c == '_' || (c == '#' && i == 0)))
        .map_or(expression.len(), |(i, _)| i);
    &expression[..end]
}

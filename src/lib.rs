//! A parser and evaluator for the standard expression language used in
//! template attributes.
//!
//! # Features
//!
//! ### Syntax
//!
//! - Variables: `${user.name}`, selections: `*{name}`
//! - Messages: `#{home.welcome(${user.name})}`
//! - Links: `@{/order/details(id=${order.id})}`
//! - Fragments: `~{footer :: copy}`
//! - Literals: `'text'`, `3.14`, `true`, `null`, `main-content`
//! - Literal substitutions: `|Hello ${user.name}!|`
//! - Arithmetic: `+ - * / %` (also `div` and `mod`)
//! - Comparison and equality: `> >= < <= == !=` (also `gt ge lt le eq ne`)
//! - Boolean logic: `and`, `or`, `!`, `not`
//! - Conditionals: `cond ? then : else`, defaults: `value ?: fallback`
//!
//! ### Engine
//!
//! - Expressions are parsed once into an immutable tree and evaluated many
//!   times against different contexts
//! - Bounded cache of compiled expressions, or bring your own
//! - Arbitrary precision decimal arithmetic
//! - Pluggable variable, message, link and fragment resolution
//! - Build contexts from any [`serde`] serializable value
//!
//! # Getting started
//!
//! Your entry point is the [`Engine`] struct. The engine stores the cache of
//! compiled expressions and the variables that restricted execution modes
//! refuse to access. Generally, you only need to construct one engine during
//! the lifetime of a program.
//!
//! ```
//! let engine = stexpr::Engine::new();
//! ```
//!
//! Expressions are evaluated against a [`Context`]. The bundled
//! [`ValueContext`] resolves variables as paths into a [`Value`].
//!
//! ```
//! use stexpr::{value, Engine, ExecutionMode, Value, ValueContext};
//!
//! let engine = Engine::new();
//! let ctx = ValueContext::new(value!({ user: { name: "John Smith", age: 42 } }));
//! let result = engine.eval("${user.age} >= 18 ? 'adult' : 'minor'", &ctx, ExecutionMode::Normal)?;
//! assert_eq!(result, Value::from("adult"));
//! # Ok::<(), stexpr::Error>(())
//! ```
//!
//! If you want to hold on to the compiled tree yourself use
//! [`.parse`][Engine::parse] and [`.evaluate`][Engine::evaluate].
//!
//! ```
//! # use stexpr::{value, Engine, ExecutionMode, Value, ValueContext};
//! let engine = Engine::new();
//! let expr = engine.parse("|Hello ${name}!|")?;
//! for name in ["John", "Jane"] {
//!     let ctx = ValueContext::new(value!({ name: name }));
//!     let result = engine.evaluate(&expr, &ctx, ExecutionMode::Normal)?;
//!     assert_eq!(result, Value::from(format!("Hello {name}!")));
//! }
//! # Ok::<(), stexpr::Error>(())
//! ```
//!
//! # Examples
//!
//! ### Evaluate using structured data
//!
//! ```
//! use stexpr::{Engine, ExecutionMode, Value, ValueContext};
//!
//! #[derive(serde::Serialize)]
//! struct Order { id: u32, items: Vec<Item> }
//!
//! #[derive(serde::Serialize)]
//! struct Item { price: f64, amount: u32 }
//!
//! let order = Order { id: 7, items: vec![Item { price: 2.5, amount: 4 }] };
//! let ctx = ValueContext::from_serialize(&order)?;
//!
//! let result = Engine::new().eval(
//!     "${items[0].price} * ${items[0].amount}",
//!     &ctx,
//!     ExecutionMode::Normal,
//! )?;
//! assert_eq!(result.to_string(), "10.0");
//! # Ok::<(), stexpr::Error>(())
//! ```
//!
//! ### Resolve messages
//!
//! Messages, links and fragments are resolved by capabilities attached to
//! the context. Without the capability the expression fails with
//! [`ErrorKind::UnsupportedContext`].
//!
//! ```
//! use stexpr::{value, Engine, ExecutionMode, Value, ValueContext};
//!
//! let ctx = ValueContext::new(value!({ name: "John" })).with_messages(
//!     |key: &str, args: &[Value]| match key {
//!         "welcome" => Some(format!("Welcome, {}!", args[0])),
//!         _ => None,
//!     },
//! );
//!
//! let result = Engine::new().eval("#{welcome(${name})}", &ctx, ExecutionMode::Normal)?;
//! assert_eq!(result, Value::from("Welcome, John!"));
//! # Ok::<(), stexpr::Error>(())
//! ```
//!
//! ### Restrict variable access
//!
//! In [`ExecutionMode::Restricted`] and [`ExecutionMode::Unescaped`] the
//! engine refuses to access [`DEFAULT_RESTRICTED_VARIABLES`] and any variable
//! added with [`Engine::add_restricted_variable`].
//!
//! ```
//! use stexpr::{value, Engine, ErrorKind, ExecutionMode, ValueContext};
//!
//! let mut engine = Engine::new();
//! engine.add_restricted_variable("secrets");
//!
//! let ctx = ValueContext::new(value!({ secrets: { key: "hunter2" } }));
//! let err = engine
//!     .eval("${secrets.key}", &ctx, ExecutionMode::Restricted)
//!     .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Evaluation);
//! ```

mod cache;
mod compile;
mod context;
mod error;
mod eval;
mod macros;
mod types;
mod value;

use std::fmt;
use std::sync::Arc;

pub use crate::cache::{ExpressionCache, StandardCache};
pub use crate::context::{
    Context, ExecutionMode, FragmentResolver, LinkBuilder, LinkParameter, MessageResolver,
    ValueContext,
};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::eval::DEFAULT_RESTRICTED_VARIABLES;
pub use crate::types::ast;
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{List, Map, Value};

use crate::ast::Expression;
use crate::eval::Evaluator;

/// Parse an expression without caching it.
///
/// # Examples
///
/// ```
/// let expr = stexpr::parse("1 + 2 * 3")?;
/// assert_eq!(expr.to_string(), "1 + (2 * 3)");
/// # Ok::<(), stexpr::Error>(())
/// ```
#[inline]
pub fn parse(input: &str) -> Result<Expression> {
    compile::parse(input)
}

/// Evaluate a parsed expression, refusing access to
/// [`DEFAULT_RESTRICTED_VARIABLES`] in restricted modes.
#[inline]
pub fn evaluate<C>(expr: &Expression, ctx: &C, mode: ExecutionMode) -> Result<Value>
where
    C: Context + ?Sized,
{
    Evaluator::new(ctx, mode, DEFAULT_RESTRICTED_VARIABLES).evaluate(expr)
}

/// The parsing and evaluation engine.
pub struct Engine<'engine> {
    cache: Option<Box<dyn ExpressionCache + 'engine>>,
    restricted_variables: Vec<&'engine str>,
}

impl<'engine> Default for Engine<'engine> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'engine> Engine<'engine> {
    /// Construct a new engine with a [`StandardCache`] of
    /// [`StandardCache::DEFAULT_CAPACITY`] expressions.
    #[inline]
    pub fn new() -> Self {
        Self::with_cache(StandardCache::default())
    }

    /// Construct a new engine with a custom cache.
    ///
    /// # Examples
    ///
    /// ```
    /// use stexpr::{Engine, StandardCache};
    ///
    /// let engine = Engine::with_cache(StandardCache::new(10_000));
    /// ```
    #[inline]
    pub fn with_cache<C>(cache: C) -> Self
    where
        C: ExpressionCache + 'engine,
    {
        Self {
            cache: Some(Box::new(cache)),
            restricted_variables: DEFAULT_RESTRICTED_VARIABLES.to_vec(),
        }
    }

    /// Construct a new engine that parses every expression it is given.
    #[inline]
    pub fn without_cache() -> Self {
        Self {
            cache: None,
            restricted_variables: DEFAULT_RESTRICTED_VARIABLES.to_vec(),
        }
    }

    /// Add a variable name that restricted execution modes refuse to access.
    ///
    /// The name is matched against the first segment of variable and
    /// selection expressions, so `user` restricts `${user.name}` too.
    #[inline]
    pub fn add_restricted_variable(&mut self, name: &'engine str) {
        if !self.restricted_variables.contains(&name) {
            self.restricted_variables.push(name);
        }
    }

    /// Parse an expression, consulting the cache first.
    ///
    /// The cache key is the trimmed input. Failed parses are never cached.
    pub fn parse(&self, input: &str) -> Result<Arc<Expression>> {
        let key = input.trim();
        let cache = match &self.cache {
            Some(cache) => cache,
            None => return compile::parse(key).map(Arc::new),
        };
        if let Some(expr) = cache.get(key) {
            log::trace!("expression cache hit: {key:?}");
            return Ok(expr);
        }
        log::trace!("expression cache miss: {key:?}");
        let expr = Arc::new(compile::parse(key)?);
        cache.put(key, Arc::clone(&expr));
        log::trace!("expression cache store: {key:?}");
        Ok(expr)
    }

    /// Evaluate a parsed expression against a context.
    #[inline]
    pub fn evaluate<C>(&self, expr: &Expression, ctx: &C, mode: ExecutionMode) -> Result<Value>
    where
        C: Context + ?Sized,
    {
        Evaluator::new(ctx, mode, &self.restricted_variables).evaluate(expr)
    }

    /// Parse and evaluate an expression.
    #[inline]
    pub fn eval<C>(&self, input: &str, ctx: &C, mode: ExecutionMode) -> Result<Value>
    where
        C: Context + ?Sized,
    {
        let expr = self.parse(input)?;
        self.evaluate(&expr, ctx, mode)
    }
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("cache", &self.cache.is_some())
            .field("restricted_variables", &self.restricted_variables)
            .finish()
    }
}

//! The runtime side of evaluation: how variables, messages, links and
//! fragments are resolved.

use std::fmt;

use crate::eval::lookup;
use crate::Value;

/// Controls which variables an expression may access.
///
/// Arithmetic and logic behave the same in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Normal,
    /// Used where the expression text may come from a less trusted source.
    /// Access to restricted variables is an error.
    Restricted,
    /// Used where the result is written without escaping. Access to
    /// restricted variables is an error.
    Unescaped,
}

impl ExecutionMode {
    /// Whether restricted variables are forbidden in this mode.
    pub fn restricts_variables(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Restricted => "restricted",
            Self::Unescaped => "unescaped",
        })
    }
}

/// The environment an expression is evaluated against.
///
/// Only variable resolution is required. The other capabilities default to
/// being unavailable, in which case evaluating the corresponding reference
/// is an error.
pub trait Context {
    /// Resolves the text inside `${...}`. Returns `None` if not found.
    fn resolve_variable(&self, expression: &str) -> Option<Value>;

    /// Resolves the text inside `*{...}` against the current selection
    /// target. Defaults to [`resolve_variable`][Context::resolve_variable].
    fn resolve_selection(&self, expression: &str) -> Option<Value> {
        self.resolve_variable(expression)
    }

    fn message_resolver(&self) -> Option<&dyn MessageResolver> {
        None
    }

    fn link_builder(&self) -> Option<&dyn LinkBuilder> {
        None
    }

    fn fragment_resolver(&self) -> Option<&dyn FragmentResolver> {
        None
    }
}

/// Resolves `#{key(args)}` references.
pub trait MessageResolver {
    /// Returns the message for `key` formatted with `args`, or `None` if
    /// there is no such message.
    fn resolve_message(&self, key: &str, args: &[Value]) -> Option<String>;
}

/// Builds URLs for `@{base(params)}` references.
pub trait LinkBuilder {
    fn build_link(&self, base: &str, params: &[LinkParameter]) -> Option<String>;
}

/// Resolves `~{template :: selector(params)}` references.
pub trait FragmentResolver {
    /// A `None` template refers to the template currently being processed.
    /// Positional parameters are named `_arg0`, `_arg1`, ...
    fn resolve_fragment(
        &self,
        template: Option<&str>,
        selector: Option<&str>,
        params: &[(String, Value)],
    ) -> Option<Value>;
}

/// An evaluated link parameter. Parameters without a value like `flag` in
/// `@{/path(flag)}` have a `None` value.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkParameter {
    pub name: String,
    pub value: Option<Value>,
}

impl<F> MessageResolver for F
where
    F: Fn(&str, &[Value]) -> Option<String>,
{
    fn resolve_message(&self, key: &str, args: &[Value]) -> Option<String> {
        self(key, args)
    }
}

impl<F> LinkBuilder for F
where
    F: Fn(&str, &[LinkParameter]) -> Option<String>,
{
    fn build_link(&self, base: &str, params: &[LinkParameter]) -> Option<String> {
        self(base, params)
    }
}

impl<F> FragmentResolver for F
where
    F: Fn(Option<&str>, Option<&str>, &[(String, Value)]) -> Option<Value>,
{
    fn resolve_fragment(
        &self,
        template: Option<&str>,
        selector: Option<&str>,
        params: &[(String, Value)],
    ) -> Option<Value> {
        self(template, selector, params)
    }
}

/// A [`Context`] backed by a [`Value`].
///
/// Variables are paths into the root value: `user.name`, `users[0].name` or
/// `settings['dark-mode']`. Selection expressions resolve against the
/// selection target if one is set, otherwise against the root.
///
/// ```
/// use stexpr::{value, Engine, ExecutionMode, Value, ValueContext};
///
/// let ctx = ValueContext::new(value!({ user: { name: "John" } }));
/// let result = Engine::new().eval("'Hi ' + ${user.name}", &ctx, ExecutionMode::Normal)?;
/// assert_eq!(result, Value::from("Hi John"));
/// # Ok::<(), stexpr::Error>(())
/// ```
pub struct ValueContext<'a> {
    root: Value,
    selection: Option<Value>,
    messages: Option<Box<dyn MessageResolver + 'a>>,
    links: Option<Box<dyn LinkBuilder + 'a>>,
    fragments: Option<Box<dyn FragmentResolver + 'a>>,
}

impl<'a> ValueContext<'a> {
    #[inline]
    pub fn new(root: Value) -> Self {
        Self {
            root,
            selection: None,
            messages: None,
            links: None,
            fragments: None,
        }
    }

    /// Builds the root value from any serializable type.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[inline]
    pub fn from_serialize<S>(root: S) -> crate::Result<Self>
    where
        S: serde::Serialize,
    {
        Ok(Self::new(crate::to_value(root)?))
    }

    /// Sets the target of `*{...}` expressions.
    #[inline]
    pub fn with_selection(mut self, target: Value) -> Self {
        self.selection = Some(target);
        self
    }

    #[inline]
    pub fn with_messages<M>(mut self, resolver: M) -> Self
    where
        M: MessageResolver + 'a,
    {
        self.messages = Some(Box::new(resolver));
        self
    }

    #[inline]
    pub fn with_links<L>(mut self, builder: L) -> Self
    where
        L: LinkBuilder + 'a,
    {
        self.links = Some(Box::new(builder));
        self
    }

    #[inline]
    pub fn with_fragments<F>(mut self, resolver: F) -> Self
    where
        F: FragmentResolver + 'a,
    {
        self.fragments = Some(Box::new(resolver));
        self
    }

    /// Returns the root value.
    #[inline]
    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl Context for ValueContext<'_> {
    fn resolve_variable(&self, expression: &str) -> Option<Value> {
        lookup::path(&self.root, expression).cloned()
    }

    fn resolve_selection(&self, expression: &str) -> Option<Value> {
        let target = self.selection.as_ref().unwrap_or(&self.root);
        lookup::path(target, expression).cloned()
    }

    fn message_resolver(&self) -> Option<&dyn MessageResolver> {
        self.messages.as_deref()
    }

    fn link_builder(&self) -> Option<&dyn LinkBuilder> {
        self.links.as_deref()
    }

    fn fragment_resolver(&self) -> Option<&dyn FragmentResolver> {
        self.fragments.as_deref()
    }
}

impl fmt::Debug for ValueContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueContext")
            .field("root", &self.root)
            .field("selection", &self.selection)
            .field("messages", &self.messages.is_some())
            .field("links", &self.links.is_some())
            .field("fragments", &self.fragments.is_some())
            .finish()
    }
}

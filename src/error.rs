use std::cmp::max;
use std::fmt;

#[cfg(feature = "unicode")]
use unicode_width::UnicodeWidthStr;

use crate::types::span::Span;

/// A convenient type alias for results in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while parsing or evaluating an expression.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    msg: String,
    span: Option<(String, Span)>,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The expression text could not be parsed.
    Syntax,
    /// An operator was applied to operands it does not support, or a variable
    /// was accessed that the execution mode forbids.
    Evaluation,
    /// The expression needs a capability that the context does not provide,
    /// e.g. message resolution.
    UnsupportedContext,
    /// A value could not be converted into a [`Value`][crate::Value].
    Serialize,
}

impl Error {
    pub(crate) fn syntax(source: &str, span: impl Into<Span>) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            msg: String::from("could not parse as expression"),
            span: Some((source.to_owned(), span.into())),
        }
    }

    pub(crate) fn evaluation(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Evaluation,
            msg: msg.into(),
            span: None,
        }
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::UnsupportedContext,
            msg: msg.into(),
            span: None,
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the expression source this error refers to, if any.
    pub fn source_text(&self) -> Option<&str> {
        self.span.as_ref().map(|(source, _)| source.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Self {
            kind: ErrorKind::Serialize,
            msg: msg.to_string(),
            span: None,
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => fmt_pretty(&self.msg, source, *span, f),
            None => write!(f, "{}", self.msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.span {
            Some((source, span)) => {
                if f.alternate() {
                    fmt_pretty(&self.msg, source, *span, f)
                } else {
                    write!(f, "{}: \"{}\"", self.msg, source)
                }
            }
            None => write!(f, "{}", self.msg),
        }
    }
}

fn fmt_pretty(msg: &str, source: &str, span: Span, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // Control characters are one byte each so the span stays valid.
    let line = source.replace(['\n', '\r', '\t'], " ");
    let col = width(&line[..span.m]);
    let underline = "^".repeat(max(1, width(&line.as_str()[span])));
    write!(
        f,
        "\n  |\n  | {line}\n  | {0:col$}{underline} {msg}\n",
        ""
    )
}

#[cfg(feature = "unicode")]
fn width(s: &str) -> usize {
    s.width()
}

#[cfg(not(feature = "unicode"))]
fn width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_underlines_span() {
        let err = Error::syntax("1 + 'abc", 4..8);
        assert_eq!(
            format!("{err:#}"),
            "\n  |\n  | 1 + 'abc\n  |     ^^^^ could not parse as expression\n"
        );
    }

    #[test]
    fn pretty_replaces_line_breaks() {
        let err = Error::syntax("1 +\n2", 3..4);
        assert_eq!(
            format!("{err:#}"),
            "\n  |\n  | 1 + 2\n  |    ^ could not parse as expression\n"
        );
    }

    #[cfg(feature = "unicode")]
    #[test]
    fn pretty_uses_display_width() {
        let err = Error::syntax("'日本' +", 8..9);
        assert_eq!(
            format!("{err:#}"),
            "\n  |\n  | '日本' +\n  |       ^ could not parse as expression\n"
        );
    }
}

//! The arena of nodes shared by decomposition and composition.
//!
//! Node text refers to other nodes with placeholders of the form `§N§`,
//! where `N` is the index of the referenced node. A placeholder only ever
//! points at a node holding a strict part of the text that contained it, so
//! following placeholders always terminates.

use std::fmt::Write;

use crate::types::ast::Expression;

/// Delimits the index inside a placeholder.
pub const PLACEHOLDER: char = '\u{00A7}';

#[cfg_attr(test, derive(Debug, PartialEq))]
pub enum Node {
    /// Text that still has to be composed.
    Raw(String),
    Resolved(Expression),
}

#[cfg_attr(test, derive(Debug))]
pub struct ParsingState {
    nodes: Vec<Node>,
    /// Set once composition gave up because the input nests too deeply.
    too_deep: bool,
}

impl ParsingState {
    /// Creates a state with an empty root node at index 0.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::Raw(String::new())],
            too_deep: false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn raw(&self, index: usize) -> Option<&str> {
        match self.nodes.get(index)? {
            Node::Raw(text) => Some(text),
            Node::Resolved(_) => None,
        }
    }

    pub fn resolved(&self, index: usize) -> Option<&Expression> {
        match self.nodes.get(index)? {
            Node::Resolved(expr) => Some(expr),
            Node::Raw(_) => None,
        }
    }

    /// Appends a raw node and returns its index.
    pub fn push_raw(&mut self, text: String) -> usize {
        self.nodes.push(Node::Raw(text));
        self.nodes.len() - 1
    }

    /// Appends a resolved node and returns its index.
    pub fn push_resolved(&mut self, expr: Expression) -> usize {
        self.nodes.push(Node::Resolved(expr));
        self.nodes.len() - 1
    }

    pub fn set_raw(&mut self, index: usize, text: String) {
        self.nodes[index] = Node::Raw(text);
    }

    pub fn resolve(&mut self, index: usize, expr: Expression) {
        self.nodes[index] = Node::Resolved(expr);
    }

    pub fn mark_too_deep(&mut self) {
        self.too_deep = true;
    }

    pub fn is_too_deep(&self) -> bool {
        self.too_deep
    }

    /// Consumes the state, returning the root expression if it was resolved.
    pub fn into_root(self) -> Option<Expression> {
        match self.nodes.into_iter().next()? {
            Node::Resolved(expr) => Some(expr),
            Node::Raw(_) => None,
        }
    }
}

/// Appends the placeholder for `index` to `buf`.
pub fn push_placeholder(buf: &mut String, index: usize) {
    let _ = write!(buf, "{PLACEHOLDER}{index}{PLACEHOLDER}");
}

/// Returns the referenced index if the whole of `text` (ignoring surrounding
/// whitespace) is a single placeholder.
pub fn parse_placeholder(text: &str) -> Option<usize> {
    let digits = text
        .trim()
        .strip_prefix(PLACEHOLDER)?
        .strip_suffix(PLACEHOLDER)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_round_trip() {
        let mut buf = String::from("x ");
        push_placeholder(&mut buf, 12);
        assert_eq!(buf, "x §12§");
        assert_eq!(parse_placeholder(" §12§ "), Some(12));
    }

    #[test]
    fn placeholder_rejects_partial() {
        assert_eq!(parse_placeholder("§1§ + §2§"), None);
        assert_eq!(parse_placeholder("§§"), None);
        assert_eq!(parse_placeholder("§1"), None);
        assert_eq!(parse_placeholder("§-1§"), None);
    }

    #[test]
    fn root_requires_resolution() {
        let mut state = ParsingState::new();
        assert_eq!(state.raw(0), Some(""));
        let i = state.push_resolved(Expression::Null);
        assert_eq!(i, 1);
        assert_eq!(state.get(1), Some(&Node::Resolved(Expression::Null)));
        state.resolve(0, Expression::Bool(true));
        assert_eq!(state.into_root(), Some(Expression::Bool(true)));
    }
}

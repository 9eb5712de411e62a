//! Storage for compiled expressions, keyed by their trimmed source text.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::ast::Expression;

/// A store of compiled expressions shared by all evaluations of an
/// [`Engine`][crate::Engine].
///
/// Implementations must tolerate concurrent misses for the same key: both
/// callers parse the expression and both store it. Which tree is kept does
/// not matter because the trees are equal.
pub trait ExpressionCache: Send + Sync {
    /// Returns the compiled tree for `key` if present.
    fn get(&self, key: &str) -> Option<Arc<Expression>>;

    /// Stores a compiled tree for `key`.
    fn put(&self, key: &str, expr: Arc<Expression>);
}

/// A bounded in-memory [`ExpressionCache`].
///
/// When full the oldest entry is evicted. The first store for a key wins,
/// later stores for the same key are ignored. A capacity of zero disables
/// caching entirely.
pub struct StandardCache {
    capacity: usize,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    map: HashMap<String, Arc<Expression>>,
    order: VecDeque<String>,
}

impl StandardCache {
    /// The capacity used by [`Engine::new`][crate::Engine::new].
    pub const DEFAULT_CAPACITY: usize = 500;

    /// Construct a new cache holding at most `capacity` expressions.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Returns the number of cached expressions.
    pub fn len(&self) -> usize {
        self.read(|inner| inner.map.len())
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every cached expression.
    pub fn clear(&self) {
        self.write(|inner| {
            inner.map.clear();
            inner.order.clear();
        })
    }

    fn read<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        // The map and the queue are never left out of sync by a panic.
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }
}

impl Default for StandardCache {
    #[inline]
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl ExpressionCache for StandardCache {
    fn get(&self, key: &str) -> Option<Arc<Expression>> {
        if self.capacity == 0 {
            return None;
        }
        self.read(|inner| inner.map.get(key).cloned())
    }

    fn put(&self, key: &str, expr: Arc<Expression>) {
        if self.capacity == 0 {
            return;
        }
        self.write(|inner| {
            if inner.map.contains_key(key) {
                return;
            }
            while inner.map.len() >= self.capacity {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.map.remove(&oldest);
                    }
                    None => break,
                }
            }
            inner.order.push_back(key.to_owned());
            inner.map.insert(key.to_owned(), expr);
        })
    }
}

impl fmt::Debug for StandardCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardCache")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

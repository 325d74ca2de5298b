//! Middleware composition.
//!
//! A [`MiddlewareChain`] is an immutable, ordered list of handler-transforming
//! functions. Wrapping folds the list around a terminal handler starting from
//! the first entry, so the **last** entry ends up outermost: it sees the
//! request first and the response last.

use std::fmt;
use std::sync::Arc;

use crate::error::ChainError;
use crate::handler::{Action, Handler, Request, SharedHandler};
use crate::response::Response;

/// A handler-transforming function: given the next handler, produce the one
/// that wraps it.
pub type MiddlewareFn = Arc<dyn Fn(SharedHandler) -> SharedHandler + Send + Sync>;

/// Build a [`MiddlewareFn`] from a closure.
pub fn middleware<F>(f: F) -> MiddlewareFn
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ordered middleware entries, shared read-only between clones.
///
/// [`MiddlewareChain::add`] never touches the receiver: it always allocates a
/// fresh slice, so chains derived from a common base cannot see each other's
/// entries.
#[derive(Clone)]
pub struct MiddlewareChain {
    entries: Arc<[MiddlewareFn]>,
}

impl MiddlewareChain {
    /// Chain holding `entries` in the given order.
    pub fn new(entries: impl IntoIterator<Item = MiddlewareFn>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// New chain: the receiver's entries followed by `entries`.
    pub fn add(&self, entries: impl IntoIterator<Item = MiddlewareFn>) -> Self {
        let entries = entries.into_iter();
        let mut combined = Vec::with_capacity(self.entries.len() + entries.size_hint().0);
        combined.extend(self.entries.iter().cloned());
        combined.extend(entries);

        Self {
            entries: combined.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wrap `terminal` in every entry of the chain.
    pub fn wrap<H: Handler + 'static>(&self, terminal: H) -> SharedHandler {
        self.compose(Arc::new(terminal))
    }

    /// Same as [`wrap`](Self::wrap) for a `request -> Option<Response>` function.
    pub fn wrap_action<F>(&self, terminal: F) -> SharedHandler
    where
        F: Fn(&Request) -> Option<Response> + Send + Sync + 'static,
    {
        self.wrap(Action::new(terminal))
    }

    /// Wrap a terminal that may be missing (e.g. looked up at wiring time).
    pub fn try_wrap(&self, terminal: Option<SharedHandler>) -> Result<SharedHandler, ChainError> {
        terminal
            .map(|terminal| self.compose(terminal))
            .ok_or(ChainError::AbsentTerminal)
    }

    /// Like [`try_wrap`](Self::try_wrap), but a missing terminal is a wiring bug.
    ///
    /// # Panics
    ///
    /// Panics if `terminal` is `None`, regardless of the chain's length.
    pub fn wrap_shared(&self, terminal: Option<SharedHandler>) -> SharedHandler {
        match self.try_wrap(terminal) {
            Ok(handler) => handler,
            Err(e) => panic!("{e}"),
        }
    }

    fn compose(&self, terminal: SharedHandler) -> SharedHandler {
        tracing::debug!(middleware = self.entries.len(), "composing handler");
        self.entries
            .iter()
            .fold(terminal, |next, middleware| middleware(next))
    }
}

impl Default for MiddlewareChain {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.entries.len())
            .finish()
    }
}

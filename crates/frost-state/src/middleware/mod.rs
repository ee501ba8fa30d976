//! Middleware pipeline.
//!
//! Every dispatch threads its [`Action`] through an ordered chain of
//! [`Middleware`]. The first middleware sees the action first and the final
//! result last; the end of the chain is the structural updater. A middleware
//! may inspect, log, rewrite the action before forwarding it, or return a
//! state without calling [`Next::run`] at all. Whatever the outermost
//! middleware returns is what the container commits.
//!
//! The chain is typed by a root [`Kind`]. Entries reaching the updater are
//! checked against it, and every middleware result must have that kind at
//! the root, so no middleware observes a state that cannot be committed.

mod history;
mod trace;

pub use history::{History, HistoryConfig};
pub use trace::{TraceActions, TraceConfig, TraceLevel};

use crate::action::Action;
use crate::apply::apply_action;
use crate::error::FrostResult;
use crate::path::Path;
use crate::shape::Kind;
use crate::update::validate_entry;
use crate::Value;
use std::sync::Arc;

/// A step in the dispatch pipeline.
///
/// Closures with the same signature implement this trait:
///
/// ```
/// use frost_state::{dispatch, path, Action, Entry, Middleware, Next, Value};
/// use std::sync::Arc;
///
/// let double = |state: &Value, action: &Action, next: Next<'_>| {
///     let _ = state;
///     next.run(&action.clone().with_entry(Entry::new(path!("seen"), true)))
/// };
/// let chain: Vec<Arc<dyn Middleware>> = vec![Arc::new(double)];
///
/// let state = Value::map([("seen", Value::from(false))]);
/// let next = dispatch(&state, &Action::new("noop"), &chain).unwrap();
/// assert_eq!(next.get("seen").and_then(Value::as_bool), Some(true));
/// ```
pub trait Middleware: Send + Sync {
    /// Handle `action` against `state`, normally by returning `next.run(action)`.
    ///
    /// `state` is the state as of the start of the dispatch, whatever this
    /// middleware's position in the chain.
    fn handle(&self, state: &Value, action: &Action, next: Next<'_>) -> FrostResult<Value>;
}

impl<F> Middleware for F
where
    F: Fn(&Value, &Action, Next<'_>) -> FrostResult<Value> + Send + Sync,
{
    fn handle(&self, state: &Value, action: &Action, next: Next<'_>) -> FrostResult<Value> {
        self(state, action, next)
    }
}

/// The rest of the chain after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
    state: &'a Value,
    kind: &'a Kind,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn Middleware>], state: &'a Value, kind: &'a Kind) -> Self {
        Self { chain, state, kind }
    }

    /// Run the remaining middleware, then the structural updater.
    ///
    /// Fails with `TypeMismatch` when an entry reaching the updater does not
    /// fit the root kind, or when a middleware returns a root of another kind.
    pub fn run(self, action: &Action) -> FrostResult<Value> {
        match self.chain.split_first() {
            Some((head, rest)) => {
                let next = Next::new(rest, self.state, self.kind);
                let value = head.handle(self.state, action, next)?;
                self.kind.check_shallow(&value, &Path::root())?;
                Ok(value)
            }
            None => {
                for entry in action.entries() {
                    validate_entry(self.kind, entry)?;
                }
                apply_action(self.state, action)
            }
        }
    }

    /// Number of middleware still to run.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }

    /// Declared kind of the root this chain produces.
    #[inline]
    pub fn kind(&self) -> &'a Kind {
        self.kind
    }
}

/// Run `action` through `chain` against an untyped `state` (pure function).
///
/// With an empty chain this is the structural updater alone.
pub fn dispatch(state: &Value, action: &Action, chain: &[Arc<dyn Middleware>]) -> FrostResult<Value> {
    dispatch_checked(&Kind::Any, state, action, chain)
}

/// Run `action` through `chain` against a `state` of root kind `kind`.
pub fn dispatch_checked(
    kind: &Kind,
    state: &Value,
    action: &Action,
    chain: &[Arc<dyn Middleware>],
) -> FrostResult<Value> {
    Next::new(chain, state, kind).run(action)
}

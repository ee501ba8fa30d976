//! Entry points shared by [`Asset`](crate::Asset) and [`Store`](crate::Store).

use crate::action::{caller_label, Action};
use crate::error::FrostResult;
use crate::lens::Focus;
use crate::middleware::{dispatch_checked, Middleware};
use crate::state::State;
use crate::update::{normalize, Partial, Update};
use crate::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Update entry points of a state container.
///
/// Every method builds one [`Action`], runs it through the container's
/// middleware and commits the result, or fails without changing anything.
/// Methods without an explicit label use the caller's `file:line`; see
/// [`Dispatch::labeled`] and [`label!`](crate::label) to name actions.
pub trait Dispatch<S: State> {
    /// What a successful dispatch returns.
    type Output;

    /// Dispatch a batch of updates as one action named `label`.
    fn dispatch(&self, label: impl Into<String>, updates: Vec<Update<'_, S>>) -> FrostResult<Self::Output>;

    /// Dispatch a prepared action.
    ///
    /// Entries reaching the updater are checked against the declared shape of `S`.
    fn dispatch_action(&self, action: Action) -> FrostResult<Self::Output>;

    /// Set the value at `lens`.
    #[track_caller]
    fn set<F>(&self, lens: F, value: impl Into<F::Target>) -> FrostResult<Self::Output>
    where
        F: Focus<S>,
    {
        self.dispatch(caller_label(), vec![Update::set(lens, value)])
    }

    /// Replace the value at `lens` with `f(current)`.
    #[track_caller]
    fn update<F, G>(&self, lens: F, f: G) -> FrostResult<Self::Output>
    where
        F: Focus<S>,
        G: FnOnce(F::Target) -> F::Target,
    {
        self.dispatch(caller_label(), vec![Update::apply(lens, f)])
    }

    /// Replace the value at `lens` with `f(current)`, which may fail.
    #[track_caller]
    fn try_update<F, G>(&self, lens: F, f: G) -> FrostResult<Self::Output>
    where
        F: Focus<S>,
        G: FnOnce(F::Target) -> FrostResult<F::Target>,
    {
        self.dispatch(caller_label(), vec![Update::try_apply(lens, f)])
    }

    /// Overwrite some fields of the record at `lens`.
    #[track_caller]
    fn patch<F>(&self, lens: F, partial: Partial) -> FrostResult<Self::Output>
    where
        F: Focus<S>,
    {
        self.dispatch(caller_label(), vec![Update::patch(lens, partial)])
    }

    /// Apply several updates as one action.
    #[track_caller]
    fn batch(&self, updates: Vec<Update<'_, S>>) -> FrostResult<Self::Output> {
        self.dispatch(caller_label(), updates)
    }

    /// The same entry points with an explicit action label.
    fn labeled(&self, label: impl Into<String>) -> Labeled<'_, Self, S>
    where
        Self: Sized,
    {
        Labeled {
            target: self,
            label: label.into(),
            _root: PhantomData,
        }
    }
}

/// A container borrowed together with an action label.
///
/// Created by [`Dispatch::labeled`].
pub struct Labeled<'c, C, S> {
    target: &'c C,
    label: String,
    _root: PhantomData<fn(&S)>,
}

impl<C: Dispatch<S>, S: State> Labeled<'_, C, S> {
    /// Set the value at `lens`.
    pub fn set<F: Focus<S>>(self, lens: F, value: impl Into<F::Target>) -> FrostResult<C::Output> {
        self.target.dispatch(self.label, vec![Update::set(lens, value)])
    }

    /// Replace the value at `lens` with `f(current)`.
    pub fn update<F, G>(self, lens: F, f: G) -> FrostResult<C::Output>
    where
        F: Focus<S>,
        G: FnOnce(F::Target) -> F::Target,
    {
        self.target.dispatch(self.label, vec![Update::apply(lens, f)])
    }

    /// Replace the value at `lens` with `f(current)`, which may fail.
    pub fn try_update<F, G>(self, lens: F, f: G) -> FrostResult<C::Output>
    where
        F: Focus<S>,
        G: FnOnce(F::Target) -> FrostResult<F::Target>,
    {
        self.target.dispatch(self.label, vec![Update::try_apply(lens, f)])
    }

    /// Overwrite some fields of the record at `lens`.
    pub fn patch<F: Focus<S>>(self, lens: F, partial: Partial) -> FrostResult<C::Output> {
        self.target.dispatch(self.label, vec![Update::patch(lens, partial)])
    }

    /// Apply several updates as one action.
    pub fn batch(self, updates: Vec<Update<'_, S>>) -> FrostResult<C::Output> {
        self.target.dispatch(self.label, updates)
    }

    /// The label actions will carry.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// The middleware chain of a container.
pub(crate) type Chain = Arc<[Arc<dyn Middleware>]>;

/// Turn updates into an action against `state`.
pub(crate) fn prepare<S: State>(
    state: &Value,
    label: String,
    updates: Vec<Update<'_, S>>,
) -> FrostResult<Action> {
    match normalize(state, &S::kind(), updates) {
        Ok(entries) => Ok(Action::with_entries(label, entries)),
        Err(e) => {
            tracing::debug!(label = %label, error = %e, "update rejected");
            Err(e)
        }
    }
}

/// Run `action` against `state` through the chain, typed by `S`.
pub(crate) fn run<S: State>(state: &Value, action: &Action, chain: &Chain) -> FrostResult<Value> {
    tracing::debug!(label = %action.label(), entries = action.len(), "dispatching action");
    let result = dispatch_checked(&S::kind(), state, action, chain);
    if let Err(e) = &result {
        tracing::debug!(label = %action.label(), error = %e, "action rejected");
    }
    result
}

/// Read the value at `lens` as its typed target.
pub(crate) fn read<S, F: Focus<S>>(state: &Value, lens: &F) -> FrostResult<F::Target> {
    let value = crate::resolve::get_at_path(state, lens.path())?;
    <F::Target as State>::from_value(value).map_err(|e| e.with_prefix(lens.path()))
}

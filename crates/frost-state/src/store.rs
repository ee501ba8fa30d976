//! Mutable state holder.
//!
//! A [`Store`] has a stable identity: clones share one cell, and each
//! successful dispatch swaps the cell's root under a write lock. Readers
//! take the read lock only long enough to clone the root, so they always
//! see a complete state. Middleware runs without any lock held.

use crate::action::Action;
use crate::asset::Asset;
use crate::container::{prepare, read, run, Chain, Dispatch};
use crate::error::FrostResult;
use crate::lens::Focus;
use crate::middleware::Middleware;
use crate::state::State;
use crate::update::Update;
use crate::{Path, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// What a successful dispatch changed.
#[derive(Clone, Debug)]
pub struct Commit {
    /// The root that was replaced.
    pub previous: Value,
    /// The root now installed.
    pub current: Value,
    /// The action that produced it.
    pub action: Action,
}

impl Commit {
    /// Whether the action may have changed the value at `path`.
    pub fn touches(&self, path: &Path) -> bool {
        self.action.touches(path)
    }
}

/// Handle returned by [`Store::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&Commit) + Send + Sync>;

struct Inner {
    state: RwLock<Value>,
    chain: Chain,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

/// A mutable holder for a state of type `S`.
///
/// Concurrent dispatches are not serialized: each runs against the root it
/// read and the last one to finish wins the swap. Serialize writers
/// externally when every update must build on the previous one.
///
/// # Examples
///
/// ```
/// use frost_state::{Dispatch, State, Store};
///
/// #[derive(Debug, Clone, PartialEq, State)]
/// struct Counter {
///     value: i64,
/// }
///
/// let store = Store::new(Counter { value: 0 });
/// let handle = store.clone();
///
/// handle.update(Counter::lens().value(), |v| v + 5).unwrap();
/// assert_eq!(store.get(Counter::lens().value()).unwrap(), 5);
/// ```
pub struct Store<S> {
    inner: Arc<Inner>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: State> Store<S> {
    /// Create a store with no middleware.
    pub fn new(initial: S) -> Self {
        Self::builder(initial).build()
    }

    /// Start configuring a store.
    pub fn builder(initial: S) -> StoreBuilder<S> {
        StoreBuilder {
            state: initial.to_value(),
            chain: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Create a store holding an asset's state and middleware.
    pub fn from_asset(asset: &Asset<S>) -> Self {
        Self::with_parts(asset.snapshot().clone(), asset.chain())
    }

    fn with_parts(state: Value, chain: Chain) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(state),
                chain,
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
            _marker: PhantomData,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Value> {
        // The lock only guards a swap of complete roots; a poisoned one still
        // holds a consistent state.
        self.inner.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Value> {
        self.inner.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// The current root. Cheap; containers are shared.
    pub fn snapshot(&self) -> Value {
        self.read_state().clone()
    }

    /// The current state, converted to `S`.
    pub fn state(&self) -> FrostResult<S> {
        S::from_value(&self.snapshot())
    }

    /// Read the value at `lens` in the current state.
    pub fn get<F: Focus<S>>(&self, lens: F) -> FrostResult<F::Target> {
        read(&self.snapshot(), &lens)
    }

    /// An immutable asset frozen at the current state, sharing this store's
    /// middleware.
    pub fn to_asset(&self) -> FrostResult<Asset<S>> {
        Asset::from_value(self.snapshot()).map(|asset| asset.with_chain(self.inner.chain.clone()))
    }

    /// Call `listener` after every successful dispatch.
    ///
    /// Listeners run on the dispatching thread, after the swap and without
    /// any lock held, so they may read or dispatch to the store.
    pub fn subscribe(&self, listener: impl Fn(&Commit) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(other, _)| *other != id);
        listeners.len() != before
    }

    /// Whether two handles share one cell.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn commit(&self, snapshot: &Value, action: Action) -> FrostResult<()> {
        let next = run::<S>(snapshot, &action, &self.inner.chain)?;
        let previous = std::mem::replace(&mut *self.write_state(), next.clone());

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        if !listeners.is_empty() {
            let commit = Commit {
                previous,
                current: next,
                action,
            };
            for listener in listeners {
                listener(&commit);
            }
        }
        Ok(())
    }
}

impl<S: State> Dispatch<S> for Store<S> {
    type Output = ();

    fn dispatch(&self, label: impl Into<String>, updates: Vec<Update<'_, S>>) -> FrostResult<()> {
        let snapshot = self.snapshot();
        let action = prepare(&snapshot, label.into(), updates)?;
        self.commit(&snapshot, action)
    }

    fn dispatch_action(&self, action: Action) -> FrostResult<()> {
        let snapshot = self.snapshot();
        self.commit(&snapshot, action)
    }
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<S> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Store");
        match self.inner.state.try_read() {
            Ok(state) => s.field("state", &*state),
            Err(_) => s.field("state", &"<locked>"),
        };
        s.field("middleware", &self.inner.chain.len()).finish()
    }
}

/// Builder for [`Store`].
pub struct StoreBuilder<S> {
    state: Value,
    chain: Vec<Arc<dyn Middleware>>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: State> StoreBuilder<S> {
    /// Append a middleware. The first one added runs outermost.
    #[must_use]
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.chain.push(Arc::new(middleware));
        self
    }

    /// Append an already shared middleware.
    #[must_use]
    pub fn with_shared_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.chain.push(middleware);
        self
    }

    /// Finish the store.
    pub fn build(self) -> Store<S> {
        Store::with_parts(self.state, self.chain.into())
    }
}

//! Immutable state container.

use crate::action::Action;
use crate::container::{prepare, read, run, Chain, Dispatch};
use crate::error::FrostResult;
use crate::lens::Focus;
use crate::middleware::Middleware;
use crate::state::State;
use crate::update::Update;
use crate::{Path, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// An immutable container holding a state of type `S`.
///
/// Every successful update returns a new `Asset`; the old one stays valid
/// and keeps its state. Both share the middleware chain and every part of
/// the state the update did not touch.
///
/// # Examples
///
/// ```
/// use frost_state::{Asset, Dispatch, Partial, State};
///
/// #[derive(Debug, Clone, PartialEq, State)]
/// struct Player {
///     #[frost(rename = "firstName")]
///     first_name: String,
///     #[frost(rename = "lastName")]
///     last_name: String,
/// }
///
/// #[derive(Debug, Clone, PartialEq, State)]
/// struct Game {
///     score: i64,
///     player: Player,
/// }
///
/// let game = Asset::new(Game {
///     score: 0,
///     player: Player { first_name: "Wall".into(), last_name: "Enberg".into() },
/// });
///
/// let next = game.update(Game::lens().score(), |s| s + 1).unwrap();
/// let next = next
///     .patch(Game::lens().player(), Partial::new().field("firstName", "Avery"))
///     .unwrap();
///
/// assert_eq!(next.get(Game::lens().score()).unwrap(), 1);
/// assert_eq!(next.get(Game::lens().player().first_name()).unwrap(), "Avery");
/// assert_eq!(game.get(Game::lens().score()).unwrap(), 0);
/// ```
pub struct Asset<S> {
    state: Value,
    chain: Chain,
    _marker: PhantomData<fn() -> S>,
}

impl<S: State> Asset<S> {
    /// Create an asset with no middleware.
    pub fn new(initial: S) -> Self {
        Self::builder(initial).build()
    }

    /// Start configuring an asset.
    pub fn builder(initial: S) -> AssetBuilder<S> {
        AssetBuilder {
            state: initial.to_value(),
            chain: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Create an asset from an untyped state, checked against `S`.
    pub fn from_value(state: Value) -> FrostResult<Self> {
        S::kind().check(&state, &Path::root())?;
        Ok(Self::with_parts(state, Arc::from(Vec::new())))
    }

    fn with_parts(state: Value, chain: Chain) -> Self {
        Self {
            state,
            chain,
            _marker: PhantomData,
        }
    }

    /// The current state, converted to `S`.
    pub fn state(&self) -> FrostResult<S> {
        S::from_value(&self.state)
    }

    /// The current state as a value. Cheap; containers are shared.
    #[inline]
    pub fn snapshot(&self) -> &Value {
        &self.state
    }

    /// Read the value at `lens`.
    pub fn get<F: Focus<S>>(&self, lens: F) -> FrostResult<F::Target> {
        read(&self.state, &lens)
    }

    /// Number of installed middleware.
    pub fn middleware_len(&self) -> usize {
        self.chain.len()
    }

    pub(crate) fn chain(&self) -> Chain {
        Arc::clone(&self.chain)
    }

    pub(crate) fn with_chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    fn commit(&self, action: &Action) -> FrostResult<Self> {
        let state = run::<S>(&self.state, action, &self.chain)?;
        Ok(Self::with_parts(state, Arc::clone(&self.chain)))
    }
}

impl<S: State> Dispatch<S> for Asset<S> {
    type Output = Asset<S>;

    fn dispatch(&self, label: impl Into<String>, updates: Vec<Update<'_, S>>) -> FrostResult<Self> {
        let action = prepare(&self.state, label.into(), updates)?;
        self.commit(&action)
    }

    fn dispatch_action(&self, action: Action) -> FrostResult<Self> {
        self.commit(&action)
    }
}

impl<S> Clone for Asset<S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            chain: Arc::clone(&self.chain),
            _marker: PhantomData,
        }
    }
}

impl<S> fmt::Debug for Asset<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("state", &self.state)
            .field("middleware", &self.chain.len())
            .finish()
    }
}

/// Builder for [`Asset`].
pub struct AssetBuilder<S> {
    state: Value,
    chain: Vec<Arc<dyn Middleware>>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: State> AssetBuilder<S> {
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

    /// Finish the asset.
    pub fn build(self) -> Asset<S> {
        Asset::with_parts(self.state, self.chain.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrostError;
    use crate::lens::Lens;
    use crate::middleware::Next;
    use crate::path;
    use crate::update::Partial;
    use std::collections::BTreeMap;

    type Scores = BTreeMap<String, i64>;

    #[test]
    fn test_updates_return_new_asset() {
        let asset = Asset::new(Scores::from([("alice".to_string(), 1)]));
        let next = asset.set(Scores::lens().at("bob"), 2).unwrap();
        assert_eq!(next.get(Scores::lens().at("bob")).unwrap(), 2);
        assert!(asset.get(Scores::lens().at("bob")).is_err());
        assert_eq!(asset.state().unwrap().len(), 1);
    }

    #[test]
    fn test_default_label_is_call_site() {
        let seen = Arc::new(std::sync::Mutex::new(String::new()));
        let record = seen.clone();
        let asset = Asset::builder(Scores::new())
            .with_middleware(move |_: &Value, action: &Action, next: Next<'_>| {
                *record.lock().unwrap() = action.label().to_owned();
                next.run(action)
            })
            .build();

        asset.set(Scores::lens().at("a"), 1).unwrap();
        let expected = format!("{}:{}", file!(), line!() - 1);
        assert_eq!(*seen.lock().unwrap(), expected);

        asset.labeled("Scores.add").set(Scores::lens().at("a"), 1).unwrap();
        assert_eq!(*seen.lock().unwrap(), "Scores.add");
    }

    #[test]
    fn test_middleware_returning_ill_shaped_root_is_rejected() {
        let asset = Asset::builder(Scores::new())
            .with_middleware(|_: &Value, _: &Action, _: Next<'_>| -> FrostResult<Value> {
                Ok(Value::from("oops"))
            })
            .build();
        let err = asset.set(Scores::lens().at("a"), 1).unwrap_err();
        assert!(matches!(err, FrostError::TypeMismatch { .. }));
        assert!(asset.state().unwrap().is_empty());
    }

    #[test]
    fn test_dispatch_action_checks_entries() {
        let asset = Asset::new(Scores::new());
        let bad = Action::new("t").with_entry(crate::Entry::new(path!("a"), "x"));
        assert!(matches!(
            asset.dispatch_action(bad).unwrap_err(),
            FrostError::TypeMismatch { .. }
        ));
        let good = Action::new("t").with_entry(crate::Entry::new(path!("a"), 3));
        assert_eq!(asset.dispatch_action(good).unwrap().state().unwrap()["a"], 3);
    }

    #[test]
    fn test_from_value_checks_kind() {
        assert!(Asset::<Scores>::from_value(Value::from(1)).is_err());
        let asset = Asset::<Scores>::from_value(Value::map([("a", Value::from(1))])).unwrap();
        assert_eq!(asset.get(Scores::lens().at("a")).unwrap(), 1);
    }

    #[test]
    fn test_patch_map() {
        let asset = Asset::new(Scores::from([("a".to_string(), 1)]));
        let next = asset
            .patch(Lens::root(), Partial::new().field("b", 2).field("a", 5))
            .unwrap();
        assert_eq!(next.state().unwrap(), Scores::from([("a".into(), 5), ("b".into(), 2)]));
    }
}

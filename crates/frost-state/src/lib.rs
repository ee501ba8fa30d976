//! Immutable state containers with path-addressed structural updates.
//!
//! `frost-state` keeps application state in a persistent value tree and
//! changes it only by producing new trees. Every change is a named
//! [`Action`] that passes through an ordered chain of [`Middleware`] before
//! the structural updater builds the new root.
//!
//! # Core Concepts
//!
//! - **Value**: immutable tree of records, maps, lists and scalars; containers
//!   are reference counted and shared between versions
//! - **Path / Lens**: untyped and typed addresses of one location in a tree
//! - **State**: trait linking a Rust type to its declared [`Kind`]; derive it
//!   to get a generated lens per field
//! - **Update**: a direct value, an updater function, or a partial patch at a
//!   lens, normalized into `(path, value)` entries
//! - **Asset / Store**: immutable and mutable containers exposing the
//!   [`Dispatch`] entry points
//!
//! # Structural sharing
//!
//! ```text
//! State' = apply_entries(State, entries)
//! ```
//!
//! - `apply_entries` is a pure function that never mutates its input
//! - only containers on the path to a written location are copied, once per batch
//! - everything else in `State'` is the same allocation as in `State`
//!
//! # Quick Start
//!
//! ```
//! use frost_state::{Asset, Dispatch, Partial, State, Update};
//!
//! #[derive(Debug, Clone, PartialEq, State)]
//! struct Player {
//!     #[frost(rename = "firstName")]
//!     first_name: String,
//!     #[frost(rename = "lastName")]
//!     last_name: String,
//! }
//!
//! #[derive(Debug, Clone, PartialEq, State)]
//! struct Game {
//!     score: i64,
//!     player: Player,
//! }
//!
//! let game = Asset::new(Game {
//!     score: 1,
//!     player: Player { first_name: "Wall".into(), last_name: "Enberg".into() },
//! });
//!
//! let lens = Game::lens();
//! let next = game
//!     .labeled("Game.bonus")
//!     .batch(vec![
//!         Update::apply(lens.score(), |s| s + 10),
//!         Update::set(lens.player().first_name(), "John Foster"),
//!     ])
//!     .unwrap();
//!
//! let state = next.state().unwrap();
//! assert_eq!(state.score, 11);
//! assert_eq!(state.player.first_name, "John Foster");
//! assert_eq!(state.player.last_name, "Enberg");
//!
//! // The previous asset is untouched.
//! assert_eq!(game.state().unwrap().score, 1);
//! ```
//!
//! # Middleware
//!
//! ```
//! use frost_state::{Action, Asset, Dispatch, History, Next, State, TraceActions, Value};
//!
//! #[derive(Debug, Clone, PartialEq, State)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! let history = History::new();
//! let counter = Asset::builder(Counter { value: 0 })
//!     .with_middleware(history.clone())
//!     .with_middleware(TraceActions::new())
//!     .with_middleware(|state: &Value, action: &Action, next: Next<'_>| {
//!         // Every middleware sees the state as of the start of the dispatch.
//!         let _ = state;
//!         next.run(action)
//!     })
//!     .build();
//!
//! let counter = counter.update(Counter::lens().value(), |v| v + 1).unwrap();
//! assert_eq!(counter.get(Counter::lens().value()).unwrap(), 1);
//! assert_eq!(history.len(), 1);
//! ```

extern crate self as frost_state;

pub mod action;
pub mod apply;
mod asset;
mod container;
pub mod error;
pub mod lens;
pub mod middleware;
pub mod path;
pub mod resolve;
pub mod shape;
pub mod state;
mod store;
pub mod update;
pub mod value;

pub use action::{Action, Entry};
pub use apply::{apply_action, apply_entries};
pub use asset::{Asset, AssetBuilder};
pub use container::{Dispatch, Labeled};
pub use error::{FrostError, FrostResult};
pub use lens::{Focus, Lens};
pub use middleware::{
    dispatch, dispatch_checked, History, HistoryConfig, Middleware, Next, TraceActions,
    TraceConfig, TraceLevel,
};
pub use path::Path;
pub use resolve::{get_at_path, try_get_at_path};
pub use shape::{FieldDef, Kind, Shape, ShapeBuilder};
pub use state::State;
pub use store::{Commit, Store, StoreBuilder, SubscriptionId};
pub use update::{normalize, validate_entry, Change, Partial, Update};
pub use value::{Number, Record, Value};

#[cfg(feature = "derive")]
pub use frost_state_derive::State;

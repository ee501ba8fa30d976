//! Typed paths.
//!
//! A [`Lens<S, T>`] is a [`Path`] that is known, at compile time, to lead
//! from a root of type `S` to a value of type `T`. Record types get a
//! generated lens (see `#[derive(State)]`) with one method per field, so a
//! misspelled field is a compile error rather than a `PathNotFound`.

use crate::state::State;
use crate::Path;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Anything that addresses a `Target` inside a root of type `S`.
///
/// Implemented by [`Lens`] and by every generated record lens.
pub trait Focus<S> {
    /// The type found at the end of the path.
    type Target: State;

    /// The untyped path.
    fn path(&self) -> &Path;
}

/// A typed path from `S` to `T`.
pub struct Lens<S, T> {
    path: Path,
    _marker: PhantomData<fn(&S) -> T>,
}

impl<S> Lens<S, S> {
    /// The lens addressing the root itself.
    pub fn root() -> Self {
        Self::unchecked(Path::root())
    }
}

impl<S, T> Lens<S, T> {
    /// Wrap an untyped path.
    ///
    /// Nothing checks that a `T` lives at `path` until the lens is used;
    /// then the runtime shape checks apply as for any untyped update.
    pub fn unchecked(path: Path) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// The untyped path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the lens, returning its path.
    #[inline]
    pub fn into_path(self) -> Path {
        self.path
    }

    /// Extend by one field. Used by generated lenses.
    #[doc(hidden)]
    pub fn field<U>(&self, name: &str) -> Lens<S, U> {
        Lens::unchecked(self.path.child(name))
    }
}

impl<S, T: State> Focus<S> for Lens<S, T> {
    type Target = T;

    fn path(&self) -> &Path {
        &self.path
    }
}

impl<S, T: State> Lens<S, BTreeMap<String, T>> {
    /// Focus on one key of a map.
    pub fn at(&self, key: impl Into<String>) -> T::Focused<S> {
        T::focus(Lens::unchecked(self.path.child(key)))
    }
}

impl<S, T: State> Lens<S, Option<T>> {
    /// Focus through an optional value.
    ///
    /// Updates below this point fail with `PathNotFound` while the value
    /// is `None`.
    pub fn some(&self) -> T::Focused<S> {
        T::focus(Lens::unchecked(self.path.clone()))
    }
}

impl<S, T> Clone for Lens<S, T> {
    fn clone(&self) -> Self {
        Self::unchecked(self.path.clone())
    }
}

impl<S, T> PartialEq for Lens<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<S, T> fmt::Debug for Lens<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lens").field(&self.path).finish()
    }
}

impl<S, T> fmt::Display for Lens<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

//! Update specs and their normalization into entries.
//!
//! Callers describe a change in one of three forms: a direct value, an
//! updater function of the current value, or a partial patch of a record.
//! [`normalize`] turns a batch of these into plain [`Entry`] values against
//! the pre-update state, checking every path and value before anything is
//! copied.

use crate::action::Entry;
use crate::error::{FrostError, FrostResult};
use crate::lens::Focus;
use crate::resolve::get_at_path;
use crate::shape::Kind;
use crate::state::State;
use crate::{Path, Value};
use std::fmt;
use std::marker::PhantomData;

/// Fields to overwrite on a record (or keys on a map), leaving the rest.
///
/// # Examples
///
/// ```
/// use frost_state::Partial;
///
/// let patch = Partial::new().field("firstName", "Avery");
/// assert_eq!(patch.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Partial {
    fields: Vec<(String, Value)>,
}

impl Partial {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite `name` with `value`.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Overwrite `name` with a typed value.
    #[must_use]
    pub fn state<T: State>(self, name: impl Into<String>, value: &T) -> Self {
        self.field(name, value.to_value())
    }

    /// Number of fields in the patch.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the patch is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Partial {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

type Updater<'a> = Box<dyn FnOnce(&Value) -> FrostResult<Value> + 'a>;

/// The change requested at a path.
pub enum Change<'a> {
    /// Replace with a value.
    Set(Value),
    /// Replace with a function of the current value.
    Apply(Updater<'a>),
    /// Overwrite some fields of a record or keys of a map.
    Merge(Partial),
}

impl fmt::Debug for Change<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Set(v) => f.debug_tuple("Set").field(v).finish(),
            Change::Apply(_) => f.write_str("Apply(..)"),
            Change::Merge(p) => f.debug_tuple("Merge").field(p).finish(),
        }
    }
}

/// One requested change against a root of type `S`.
///
/// Typed constructors take a lens, so the path and the value type are
/// checked by the compiler; the `*_value` constructors take untyped paths
/// and are checked at runtime.
pub struct Update<'a, S> {
    path: Path,
    change: Change<'a>,
    _root: PhantomData<fn(&S)>,
}

impl<'a, S> Update<'a, S> {
    fn new(path: Path, change: Change<'a>) -> Self {
        Self {
            path,
            change,
            _root: PhantomData,
        }
    }

    /// Set the value at `lens`.
    pub fn set<F>(lens: F, value: impl Into<F::Target>) -> Self
    where
        F: Focus<S>,
    {
        let value = value.into().to_value();
        Self::new(lens.path().clone(), Change::Set(value))
    }

    /// Replace the value at `lens` with `f(current)`.
    ///
    /// `f` runs exactly once, during normalization, with the value in the
    /// pre-update state.
    pub fn apply<F, G>(lens: F, f: G) -> Self
    where
        F: Focus<S>,
        G: FnOnce(F::Target) -> F::Target + 'a,
    {
        Self::try_apply(lens, move |current| Ok(f(current)))
    }

    /// Like [`Update::apply`], for updaters that can fail.
    ///
    /// An error aborts the whole dispatch.
    pub fn try_apply<F, G>(lens: F, f: G) -> Self
    where
        F: Focus<S>,
        G: FnOnce(F::Target) -> FrostResult<F::Target> + 'a,
    {
        let updater: Updater<'a> = Box::new(move |current: &Value| {
            let current = <F::Target as State>::from_value(current)?;
            Ok(f(current)?.to_value())
        });
        Self::new(lens.path().clone(), Change::Apply(updater))
    }

    /// Overwrite some fields of the record at `lens`.
    pub fn patch<F>(lens: F, partial: Partial) -> Self
    where
        F: Focus<S>,
    {
        Self::new(lens.path().clone(), Change::Merge(partial))
    }

    /// Set the value at an untyped path.
    pub fn set_value(path: Path, value: impl Into<Value>) -> Self {
        Self::new(path, Change::Set(value.into()))
    }

    /// Replace the value at an untyped path with `f(current)`.
    pub fn apply_value<G>(path: Path, f: G) -> Self
    where
        G: FnOnce(&Value) -> Value + 'a,
    {
        Self::new(path, Change::Apply(Box::new(move |v: &Value| Ok(f(v)))))
    }

    /// Overwrite some fields of the record at an untyped path.
    pub fn patch_value(path: Path, partial: Partial) -> Self {
        Self::new(path, Change::Merge(partial))
    }

    /// Where the change applies.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The requested change.
    #[inline]
    pub fn change(&self) -> &Change<'a> {
        &self.change
    }
}

impl<S> fmt::Debug for Update<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("path", &self.path)
            .field("change", &self.change)
            .finish()
    }
}

/// Check one entry against the declared kind of the root.
///
/// Rejects malformed paths with `InvalidPath`, paths the declared shape has
/// no place for with `PathNotFound`, and ill-typed values with
/// `TypeMismatch`.
pub fn validate_entry(root_kind: &Kind, entry: &Entry) -> FrostResult<()> {
    entry.path.validate()?;
    let kind = root_kind.at(&entry.path)?;
    kind.check(&entry.value, &entry.path)
}

/// Normalize a batch of updates into entries.
///
/// Runs against the pre-update `root`: updater functions see the value
/// before any update in the batch, and patches are checked against the
/// target's declared shape. Any failure aborts the whole batch.
pub fn normalize<S>(
    root: &Value,
    root_kind: &Kind,
    updates: Vec<Update<'_, S>>,
) -> FrostResult<Vec<Entry>> {
    let mut entries = Vec::with_capacity(updates.len());
    for Update { path, change, .. } in updates {
        path.validate()?;
        match change {
            Change::Set(value) => entries.push(Entry { path, value }),
            Change::Apply(f) => {
                let value = f(get_at_path(root, &path)?)?;
                entries.push(Entry { path, value });
            }
            Change::Merge(partial) => {
                let target = root_kind.at(&path)?;
                merge_entries(root, &target, &path, partial, &mut entries)?;
            }
        }
    }
    for entry in &entries {
        validate_entry(root_kind, entry)?;
    }
    Ok(entries)
}

fn merge_entries(
    root: &Value,
    target: &Kind,
    path: &Path,
    partial: Partial,
    out: &mut Vec<Entry>,
) -> FrostResult<()> {
    match target {
        Kind::Optional(inner) => merge_entries(root, inner, path, partial, out),
        Kind::Record(shape) => {
            for (name, value) in partial.fields {
                if shape.field(&name).is_none() {
                    return Err(FrostError::unknown_field(path.clone(), name, shape.name()));
                }
                out.push(Entry {
                    path: path.child(name),
                    value,
                });
            }
            Ok(())
        }
        Kind::Map(_) => {
            out.extend(partial.fields.into_iter().map(|(key, value)| Entry {
                path: path.child(key),
                value,
            }));
            Ok(())
        }
        Kind::Any => {
            let current = get_at_path(root, path)?;
            match current {
                Value::Record(record) => {
                    let kind = Kind::Record(record.shape().clone());
                    merge_entries(root, &kind, path, partial, out)
                }
                Value::Map(_) => merge_entries(root, &Kind::map(Kind::Any), path, partial, out),
                other => Err(FrostError::type_mismatch(
                    path.clone(),
                    "record or map",
                    other.type_name(),
                )),
            }
        }
        other => Err(FrostError::type_mismatch(
            path.clone(),
            "record or map",
            other.name(),
        )),
    }
}

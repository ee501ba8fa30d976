//! Actions: named batches of update entries.

use crate::{Path, Value};
use serde::Serialize;
use std::collections::BTreeSet;
use std::panic::Location;

/// A single `(path, value)` replacement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entry {
    /// Where the value goes. The empty path replaces the root.
    pub path: Path,
    /// The replacement.
    pub value: Value,
}

impl Entry {
    /// Create an entry.
    #[inline]
    pub fn new(path: Path, value: impl Into<Value>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }
}

/// A named, atomic batch of update entries.
///
/// Entries apply in order; for overlapping paths the later entry wins.
///
/// # Examples
///
/// ```
/// use frost_state::{path, Action, Entry, Value};
///
/// let action = Action::new("Game.reset")
///     .with_entry(Entry::new(path!("score"), 0))
///     .with_entry(Entry::new(path!("player", "firstName"), "Wall"));
///
/// assert_eq!(action.label(), "Game.reset");
/// assert_eq!(action.len(), 2);
/// assert!(action.touches(&path!("player")));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Action {
    label: String,
    entries: Vec<Entry>,
}

impl Action {
    /// Create an empty action.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
        }
    }

    /// Create an action from entries.
    pub fn with_entries(label: impl Into<String>, entries: Vec<Entry>) -> Self {
        Self {
            label: label.into(),
            entries,
        }
    }

    /// Add an entry (builder pattern).
    #[must_use]
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add an entry.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Replace the label, keeping the entries.
    #[must_use]
    pub fn relabel(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The action's label.
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The entries, in application order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Consume the action, returning its entries.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the action carries no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths written by this action.
    ///
    /// With `include_parents`, every ancestor of a written path (except the
    /// root) is included as well.
    pub fn touched(&self, include_parents: bool) -> BTreeSet<Path> {
        let mut touched = BTreeSet::new();
        for entry in &self.entries {
            if include_parents {
                let mut current = Path::root();
                for seg in entry.path.iter() {
                    current.push(seg);
                    touched.insert(current.clone());
                }
            }
            touched.insert(entry.path.clone());
        }
        touched
    }

    /// Whether any entry may have changed the value at `path`.
    ///
    /// True when an entry writes `path`, one of its ancestors, or something
    /// below it.
    pub fn touches(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path.overlaps(path))
    }
}

/// Default label for an update: the caller's `file:line`.
#[track_caller]
pub(crate) fn caller_label() -> String {
    let loc = Location::caller();
    format!("{}:{}", loc.file(), loc.line())
}

#[doc(hidden)]
pub fn __type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Turn the path of a marker fn into a `"Type.method"` label.
#[doc(hidden)]
pub fn __label_from_fn_path(full: &str) -> String {
    let mut segments: Vec<&str> = full
        .split("::")
        .filter(|s| *s != "{{closure}}" && *s != "__frost_label_marker")
        .collect();
    let method = segments.pop().unwrap_or_default();
    match segments.pop() {
        Some(owner) => format!("{owner}.{method}"),
        None => method.to_owned(),
    }
}

/// Label derived from the enclosing function, such as `"Game.reset"`.
///
/// Inside an inherent method this yields `"Type.method"`; in a free
/// function, `"module.function"`.
///
/// ```
/// mod game {
///     pub struct Game;
///     impl Game {
///         pub fn reset() -> String {
///             frost_state::label!()
///         }
///     }
/// }
///
/// assert_eq!(game::Game::reset(), "Game.reset");
/// ```
#[macro_export]
macro_rules! label {
    () => {{
        fn __frost_label_marker() {}
        $crate::action::__label_from_fn_path($crate::action::__type_name_of(__frost_label_marker))
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    struct Scoreboard;

    impl Scoreboard {
        fn bump() -> String {
            crate::label!()
        }

        fn in_closure() -> String {
            let f = || crate::label!();
            f()
        }
    }

    #[test]
    fn test_label_macro_names_type_and_method() {
        assert_eq!(Scoreboard::bump(), "Scoreboard.bump");
        assert_eq!(Scoreboard::in_closure(), "Scoreboard.in_closure");
    }

    #[test]
    fn test_label_macro_in_free_function() {
        assert_eq!(crate::label!(), "tests.test_label_macro_in_free_function");
    }

    #[test]
    fn test_caller_label_points_here() {
        let label = caller_label();
        assert!(label.starts_with(file!()));
        assert!(label.ends_with(&format!(":{}", line!() - 2)));
    }

    #[test]
    fn test_touched() {
        let action = Action::new("t")
            .with_entry(Entry::new(path!("user", "name"), "Alice"))
            .with_entry(Entry::new(path!("user", "age"), 30));

        let touched = action.touched(false);
        assert!(touched.contains(&path!("user", "name")));
        assert!(!touched.contains(&path!("user")));

        let with_parents = action.touched(true);
        assert!(with_parents.contains(&path!("user")));
        assert!(with_parents.contains(&path!("user", "age")));
    }

    #[test]
    fn test_touches_is_prefix_aware() {
        let action = Action::new("t").with_entry(Entry::new(path!("player"), Value::Null));
        assert!(action.touches(&path!("player", "firstName")));
        assert!(action.touches(&Path::root()));
        assert!(!action.touches(&path!("score")));
    }

    #[test]
    fn test_action_serializes() {
        let action = Action::new("Game.bump").with_entry(Entry::new(path!("score"), 1));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"label": "Game.bump", "entries": [{"path": ["score"], "value": 1}]})
        );
    }
}

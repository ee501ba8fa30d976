//! Structural update logic.
//!
//! This module contains the pure [`apply_entries`] function that folds a batch
//! of `(path, value)` entries into a new root. The input is never modified.
//! Only the containers on the way from the root to a written location are
//! copied, once per batch; every other subtree of the result is the same
//! allocation as in the input.

use crate::action::{Action, Entry};
use crate::error::{FrostError, FrostResult};
use crate::{Path, Value};
use std::collections::BTreeMap;

type Pending<'e> = (&'e [String], &'e Value);

/// Apply a batch of entries to a root value (pure function).
///
/// Entries apply in order. Where one entry's path is a prefix of, or equal
/// to, another's, the later entry wins for the overlapping part: replacing
/// `player` and then setting `player.firstName` sets the name inside the new
/// player, while the reverse order discards the name.
///
/// Fails with `PathNotFound` when a segment other than a new map key does
/// not resolve, including segments below a value written earlier in the
/// same batch. On failure nothing is returned; the batch is all-or-nothing.
///
/// # Examples
///
/// ```
/// use frost_state::{apply_entries, path, Entry, Value};
///
/// let state = Value::map([
///     ("score", Value::from(0)),
///     ("player", Value::map([("firstName", Value::from("Wall"))])),
///     ("settings", Value::map([("volume", Value::from(7))])),
/// ]);
///
/// let next = apply_entries(
///     &state,
///     &[
///         Entry::new(path!("score"), 11),
///         Entry::new(path!("player", "firstName"), "John Foster"),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(next.get("score").and_then(Value::as_i64), Some(11));
/// // Untouched subtrees are shared, not copied.
/// assert!(Value::ptr_eq(next.get("settings").unwrap(), state.get("settings").unwrap()));
/// // The original is unchanged.
/// assert_eq!(state.get("score").and_then(Value::as_i64), Some(0));
/// ```
pub fn apply_entries(root: &Value, entries: &[Entry]) -> FrostResult<Value> {
    if entries.is_empty() {
        return Ok(root.clone());
    }
    let pending: Vec<Pending<'_>> = entries
        .iter()
        .map(|e| {
            tracing::trace!(path = %e.path, kind = e.value.type_name(), "apply entry");
            (e.path.segments(), &e.value)
        })
        .collect();
    let mut at = Path::root();
    apply_at(root, &pending, &mut at)
}

/// Apply an action's entries to a root value.
#[inline]
pub fn apply_action(root: &Value, action: &Action) -> FrostResult<Value> {
    apply_entries(root, action.entries())
}

/// Fold `pending` (paths relative to `at`) into `current`.
fn apply_at(current: &Value, pending: &[Pending<'_>], at: &mut Path) -> FrostResult<Value> {
    // The last entry ending here replaces this node; earlier ones are moot
    // and later ones apply on top of the replacement.
    let (base, rest) = match pending.iter().rposition(|(segs, _)| segs.is_empty()) {
        Some(idx) => (pending[idx].1, &pending[idx + 1..]),
        None => (current, pending),
    };
    if rest.is_empty() {
        return Ok(base.clone());
    }

    let groups = group_by_head(rest);
    match base {
        Value::Record(record) => {
            let mut fields = record.values().to_vec();
            for (name, group) in groups {
                at.push(name);
                let idx = record
                    .shape()
                    .position(name)
                    .ok_or_else(|| FrostError::path_not_found(at.clone()))?;
                let next = apply_at(&fields[idx], &group, at)?;
                fields[idx] = next;
                at.pop();
            }
            Ok(Value::Record(record.with_values(fields)))
        }
        Value::Map(map) => {
            let mut entries = BTreeMap::clone(map);
            for (key, group) in groups {
                at.push(key);
                let next = match entries.get(key) {
                    Some(existing) => apply_at(existing, &group, at)?,
                    None => insert_new(&group, at)?,
                };
                entries.insert(key.to_owned(), next);
                at.pop();
            }
            Ok(Value::Map(std::sync::Arc::new(entries)))
        }
        _ => {
            let (name, _) = &groups[0];
            Err(FrostError::path_not_found(at.child(*name)))
        }
    }
}

/// A map key that does not exist yet may only be created by an entry
/// ending at that key.
fn insert_new(pending: &[Pending<'_>], at: &Path) -> FrostResult<Value> {
    if pending.iter().any(|(segs, _)| segs.is_empty()) {
        let mut at = at.clone();
        apply_at(&Value::Null, pending, &mut at)
    } else {
        Err(FrostError::path_not_found(at.clone()))
    }
}

/// Split entries by first segment, keeping first-appearance order across
/// groups and entry order within each group.
fn group_by_head<'e>(pending: &[Pending<'e>]) -> Vec<(&'e str, Vec<Pending<'e>>)> {
    let mut groups: Vec<(&'e str, Vec<Pending<'e>>)> = Vec::new();
    for &(segs, value) in pending {
        let Some((head, tail)) = segs.split_first() else {
            continue;
        };
        let item = (tail, value);
        match groups.iter_mut().find(|(name, _)| *name == head.as_str()) {
            Some((_, group)) => group.push(item),
            None => groups.push((head.as_str(), vec![item])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;
    use crate::shape::{Kind, Shape};
    use crate::Record;
    use std::sync::Arc;

    fn player_shape() -> Arc<Shape> {
        Shape::builder("Player")
            .field("firstName", Kind::String)
            .field("lastName", Kind::String)
            .build()
            .unwrap()
    }

    fn player(first: &str, last: &str) -> Value {
        Record::new(player_shape(), vec![Value::from(first), Value::from(last)])
            .unwrap()
            .into()
    }

    fn game() -> Value {
        let shape = Shape::builder("Game")
            .field("score", Kind::Int)
            .field("player", Kind::Record(player_shape()))
            .field("tags", Kind::map(Kind::Int))
            .build()
            .unwrap();
        Record::new(
            shape,
            vec![
                Value::from(0),
                player("Wall", "Enberg"),
                Value::map([("a", Value::from(1)), ("b", Value::from(2))]),
            ],
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_set_leaf_shares_siblings() {
        let g = game();
        let next = apply_entries(&g, &[Entry::new(path!("score"), 5)]).unwrap();
        assert_eq!(next.get("score").and_then(Value::as_i64), Some(5));
        assert!(!Value::ptr_eq(&next, &g));
        assert!(Value::ptr_eq(next.get("player").unwrap(), g.get("player").unwrap()));
        assert!(Value::ptr_eq(next.get("tags").unwrap(), g.get("tags").unwrap()));
    }

    #[test]
    fn test_shared_prefix_copied_once() {
        let g = game();
        let next = apply_entries(
            &g,
            &[
                Entry::new(path!("player", "firstName"), "Avery"),
                Entry::new(path!("player", "lastName"), "Foster"),
            ],
        )
        .unwrap();
        let p = next.get("player").unwrap();
        assert_eq!(p.get("firstName").and_then(Value::as_str), Some("Avery"));
        assert_eq!(p.get("lastName").and_then(Value::as_str), Some("Foster"));
        assert!(Value::ptr_eq(next.get("tags").unwrap(), g.get("tags").unwrap()));
    }

    #[test]
    fn test_last_write_wins() {
        let g = game();
        let next = apply_entries(
            &g,
            &[Entry::new(path!("score"), 1), Entry::new(path!("score"), 2)],
        )
        .unwrap();
        assert_eq!(next.get("score").and_then(Value::as_i64), Some(2));
    }

    #[test]
    fn test_replace_then_narrow_applies_in_order() {
        let g = game();
        let next = apply_entries(
            &g,
            &[
                Entry::new(path!("player"), player("Ann", "Lee")),
                Entry::new(path!("player", "firstName"), "Bo"),
            ],
        )
        .unwrap();
        let p = next.get("player").unwrap();
        assert_eq!(p.get("firstName").and_then(Value::as_str), Some("Bo"));
        assert_eq!(p.get("lastName").and_then(Value::as_str), Some("Lee"));
    }

    #[test]
    fn test_narrow_then_replace_discards_narrow() {
        let g = game();
        let next = apply_entries(
            &g,
            &[
                Entry::new(path!("player", "firstName"), "Bo"),
                Entry::new(path!("player"), player("Ann", "Lee")),
            ],
        )
        .unwrap();
        let p = next.get("player").unwrap();
        assert_eq!(p.get("firstName").and_then(Value::as_str), Some("Ann"));
    }

    #[test]
    fn test_root_entry_owns_result_but_later_entries_apply() {
        let g = game();
        let replacement = apply_entries(&g, &[Entry::new(path!("score"), 40)]).unwrap();
        let next = apply_entries(
            &g,
            &[
                Entry::new(path!("tags", "a"), 9),
                Entry::new(Path::root(), replacement.clone()),
                Entry::new(path!("score"), 41),
            ],
        )
        .unwrap();
        assert_eq!(next.get("score").and_then(Value::as_i64), Some(41));
        // The tag write came before the root replacement and is discarded.
        assert_eq!(next.get("tags").and_then(|t| t.get("a")).and_then(Value::as_i64), Some(1));
    }

    #[test]
    fn test_map_new_key_only_at_final_segment() {
        let g = game();
        let next = apply_entries(&g, &[Entry::new(path!("tags", "c"), 3)]).unwrap();
        assert_eq!(next.get("tags").and_then(|t| t.get("c")).and_then(Value::as_i64), Some(3));

        match apply_entries(&g, &[Entry::new(path!("tags", "c", "d"), 3)]).unwrap_err() {
            FrostError::PathNotFound { path } => assert_eq!(path, path!("tags", "c")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_and_leaf_navigation_fail() {
        let g = game();
        match apply_entries(&g, &[Entry::new(path!("player", "middleName"), "X")]).unwrap_err() {
            FrostError::PathNotFound { path } => assert_eq!(path, path!("player", "middleName")),
            other => panic!("unexpected error: {other:?}"),
        }
        match apply_entries(&g, &[Entry::new(path!("score", "digits"), 1)]).unwrap_err() {
            FrostError::PathNotFound { path } => assert_eq!(path, path!("score", "digits")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failure_aborts_whole_batch() {
        let g = game();
        let before = g.clone();
        let result = apply_entries(
            &g,
            &[
                Entry::new(path!("score"), 99),
                Entry::new(path!("nope", "x"), 1),
            ],
        );
        assert!(result.is_err());
        assert_eq!(g, before);
        assert_eq!(g.get("score").and_then(Value::as_i64), Some(0));
    }

    #[test]
    fn test_empty_batch_returns_same_root() {
        let g = game();
        assert!(Value::ptr_eq(&apply_entries(&g, &[]).unwrap(), &g));
    }

    #[test]
    fn test_same_value_is_equal_but_new_root() {
        let g = game();
        let next = apply_entries(&g, &[Entry::new(path!("score"), 0)]).unwrap();
        assert_eq!(next, g);
        assert!(!Value::ptr_eq(&next, &g));
    }
}

//! Read-only navigation by path.

use crate::error::{FrostError, FrostResult};
use crate::{Path, Value};

/// Get the value at `path`, borrowing from `root`.
///
/// Navigation never copies. Each segment must name a field of a record or
/// a key of a map; lists are leaves. The error identifies the first segment
/// that does not resolve.
///
/// # Examples
///
/// ```
/// use frost_state::{get_at_path, path, Value};
///
/// let state = Value::map([("player", Value::map([("firstName", Value::from("Wall"))]))]);
///
/// let name = get_at_path(&state, &path!("player", "firstName")).unwrap();
/// assert_eq!(name.as_str(), Some("Wall"));
///
/// assert!(get_at_path(&state, &path!("player", "middleName")).is_err());
/// ```
pub fn get_at_path<'a>(root: &'a Value, path: &Path) -> FrostResult<&'a Value> {
    let mut current = root;
    for (depth, seg) in path.iter().enumerate() {
        current = current
            .get(seg)
            .ok_or_else(|| FrostError::path_not_found(path.prefix(depth + 1)))?;
    }
    Ok(current)
}

/// Like [`get_at_path`], returning `None` instead of an error.
#[inline]
pub fn try_get_at_path<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    path.iter().try_fold(root, |current, seg| current.get(seg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn state() -> Value {
        Value::map([
            ("score", Value::from(3)),
            ("tags", Value::list([Value::from("a")])),
            (
                "settings",
                Value::map([("theme", Value::map([("accent", Value::from("teal"))]))]),
            ),
        ])
    }

    #[test]
    fn test_resolves_nested() {
        let s = state();
        let accent = get_at_path(&s, &path!("settings", "theme", "accent")).unwrap();
        assert_eq!(accent.as_str(), Some("teal"));
    }

    #[test]
    fn test_root_path_returns_root() {
        let s = state();
        assert!(Value::ptr_eq(get_at_path(&s, &Path::root()).unwrap(), &s));
    }

    #[test]
    fn test_resolution_borrows_without_copying() {
        let s = state();
        let theme = get_at_path(&s, &path!("settings", "theme")).unwrap();
        assert!(Value::ptr_eq(theme, s.get("settings").unwrap().get("theme").unwrap()));
    }

    #[test]
    fn test_reports_first_unresolvable_segment() {
        let s = state();
        match get_at_path(&s, &path!("settings", "font", "size")).unwrap_err() {
            FrostError::PathNotFound { path } => assert_eq!(path, path!("settings", "font")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_lists_and_scalars_are_leaves() {
        let s = state();
        assert!(get_at_path(&s, &path!("tags", "0")).is_err());
        assert!(get_at_path(&s, &path!("score", "x")).is_err());
        assert!(try_get_at_path(&s, &path!("score", "x")).is_none());
    }
}

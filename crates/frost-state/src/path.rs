//! Field paths for navigating a state tree.
//!
//! A path is an ordered sequence of field names leading from the state root
//! to a single addressable location. Every segment names either a record field
//! or a map key; lists are opaque leaves and are never indexed into.

use crate::error::{FrostError, FrostResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Designator of the state root in rendered paths. Reserved as a field name.
pub const ROOT: &str = "$";

/// A complete path into a state tree.
///
/// The empty path addresses the root itself: an update at the empty path
/// replaces the whole value.
///
/// # Examples
///
/// ```
/// use frost_state::Path;
///
/// let path = Path::root().key("player").key("firstName");
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "$.player.firstName");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Path(Vec<String>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an empty path (alias for `new`).
    #[inline]
    pub fn root() -> Self {
        Self::new()
    }

    /// Create a path from a vector of field names.
    #[inline]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Parse a dotted path such as `"player.firstName"`.
    ///
    /// The empty string and `"$"` denote the root; a leading `"$."` is
    /// accepted so rendered paths parse back. Empty segments and the root
    /// designator used as a field name are rejected with `InvalidPath`.
    pub fn parse(text: &str) -> FrostResult<Self> {
        let body = match text {
            "" | ROOT => return Ok(Self::root()),
            _ => text.strip_prefix("$.").unwrap_or(text),
        };
        let path: Path = body.split('.').map(str::to_owned).collect();
        path.validate()?;
        Ok(path)
    }

    /// Append a field segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(k.into());
        self
    }

    /// Push a field segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, k: impl Into<String>) {
        self.0.push(k.into());
    }

    /// Pop the last segment from the path.
    #[inline]
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the first segment.
    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Join this path with another path.
    #[inline]
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Append a segment and return a new path (non-mutating builder).
    #[inline]
    pub fn child(&self, k: impl Into<String>) -> Path {
        let mut result = self.clone();
        result.0.push(k.into());
        result
    }

    /// Check if this path is a prefix of another path.
    ///
    /// A path is a prefix of itself, and the root is a prefix of every path.
    ///
    /// ```
    /// use frost_state::path;
    ///
    /// let parent = path!("player");
    /// let child = path!("player", "firstName");
    ///
    /// assert!(parent.is_prefix_of(&child));
    /// assert!(!child.is_prefix_of(&parent));
    /// assert!(parent.is_prefix_of(&parent));
    /// ```
    #[inline]
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Check whether one of the two paths is a prefix of the other.
    #[inline]
    pub fn overlaps(&self, other: &Path) -> bool {
        self.is_prefix_of(other) || other.is_prefix_of(self)
    }

    /// Get the parent path (path without the last segment).
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            let mut p = self.clone();
            p.pop();
            Some(p)
        }
    }

    /// The first `len` segments as a new path.
    #[inline]
    pub fn prefix(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Reject empty segments and the reserved root designator.
    pub fn validate(&self) -> FrostResult<()> {
        for seg in &self.0 {
            if seg.is_empty() {
                return Err(FrostError::invalid_path(self.to_string(), "empty segment"));
            }
            if seg == ROOT {
                return Err(FrostError::invalid_path(
                    self.to_string(),
                    "the root designator `$` is not a field name",
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ROOT}")?;
        for seg in &self.0 {
            write!(f, ".{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = FrostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Path {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Path {
    type Output = str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Construct a `Path` from a sequence of field names.
///
/// # Examples
///
/// ```
/// use frost_state::path;
///
/// let p = path!("player", "firstName");
/// assert_eq!(p.len(), 2);
///
/// let root = path!();
/// assert!(root.is_empty());
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($seg);
        )+
        p
    }};
}

//! Error types for frost-state operations.

use crate::Path;
use thiserror::Error;

/// Result type alias for frost-state operations.
pub type FrostResult<T> = Result<T, FrostError>;

/// Errors that can occur while resolving, validating, or applying updates.
///
/// Every variant aborts the dispatch that raised it; the container's current
/// state is never replaced by a failed dispatch.
#[derive(Debug, Error)]
pub enum FrostError {
    /// A path segment does not resolve during navigation or copy.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The path up to and including the first unresolvable segment.
        path: Path,
    },

    /// A partial patch names a field the target record does not declare.
    #[error("unknown field `{field}` on {shape} at {path}")]
    UnknownField {
        /// Path of the patched record.
        path: Path,
        /// The offending field name.
        field: String,
        /// Name of the record shape.
        shape: String,
    },

    /// A value does not match the kind declared for its location.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path where the mismatch occurred.
        path: Path,
        /// Description of the declared kind.
        expected: String,
        /// The kind of value found.
        found: &'static str,
    },

    /// The path itself is malformed.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath {
        /// The rendered path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A record value lacks a field its shape declares.
    #[error("missing field `{field}` for {shape}")]
    MissingField {
        /// Name of the record shape.
        shape: String,
        /// The missing field.
        field: String,
    },

    /// A middleware refused the action.
    #[error("action `{label}` rejected: {reason}")]
    Rejected {
        /// Label of the rejected action.
        label: String,
        /// Why it was rejected.
        reason: String,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FrostError {
    /// Create a path not found error.
    #[inline]
    pub fn path_not_found(path: Path) -> Self {
        FrostError::PathNotFound { path }
    }

    /// Create an unknown field error.
    #[inline]
    pub fn unknown_field(path: Path, field: impl Into<String>, shape: impl Into<String>) -> Self {
        FrostError::UnknownField {
            path,
            field: field.into(),
            shape: shape.into(),
        }
    }

    /// Create a type mismatch error.
    #[inline]
    pub fn type_mismatch(path: Path, expected: impl Into<String>, found: &'static str) -> Self {
        FrostError::TypeMismatch {
            path,
            expected: expected.into(),
            found,
        }
    }

    /// Create an invalid path error.
    #[inline]
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FrostError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing field error.
    #[inline]
    pub fn missing_field(shape: impl Into<String>, field: impl Into<String>) -> Self {
        FrostError::MissingField {
            shape: shape.into(),
            field: field.into(),
        }
    }

    /// Create a rejection error, for middleware that vetoes an action.
    #[inline]
    pub fn rejected(label: impl Into<String>, reason: impl Into<String>) -> Self {
        FrostError::Rejected {
            label: label.into(),
            reason: reason.into(),
        }
    }

    /// Add a path prefix to this error.
    ///
    /// Used when converting nested records so an error raised for field
    /// `city` inside `address` reports `address.city`.
    pub fn with_prefix(self, prefix: &Path) -> Self {
        match self {
            FrostError::PathNotFound { path } => FrostError::PathNotFound {
                path: prefix.join(&path),
            },
            FrostError::TypeMismatch {
                path,
                expected,
                found,
            } => FrostError::TypeMismatch {
                path: prefix.join(&path),
                expected,
                found,
            },
            FrostError::UnknownField { path, field, shape } => FrostError::UnknownField {
                path: prefix.join(&path),
                field,
                shape,
            },
            other => other,
        }
    }
}

//! Declared shapes of state values.
//!
//! A [`Shape`] describes one record type: its name and its fields in
//! declaration order, each with a [`Kind`]. Shapes are built once (the derive
//! macro caches them in a `OnceLock`) and shared by every record value of that
//! type through an `Arc`, so checking that a record has the expected shape is
//! usually a pointer comparison.

use crate::error::{FrostError, FrostResult};
use crate::path::ROOT;
use crate::{Path, Value};
use std::fmt;
use std::sync::Arc;

static ANY: Kind = Kind::Any;

/// The declared kind of a location in the state tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    /// Anything goes; no checks below this point.
    Any,
    /// `true` / `false`.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// Floating point number. Integers are accepted and widened.
    Float,
    /// UTF-8 string.
    String,
    /// `Null` or the inner kind.
    Optional(Box<Kind>),
    /// Ordered sequence, replaced wholesale.
    List(Box<Kind>),
    /// Dynamic-key associative container.
    Map(Box<Kind>),
    /// Record of the given shape.
    Record(Arc<Shape>),
}

impl Kind {
    /// `Optional(inner)`.
    pub fn optional(inner: Kind) -> Self {
        Kind::Optional(Box::new(inner))
    }

    /// `List(inner)`.
    pub fn list(inner: Kind) -> Self {
        Kind::List(Box::new(inner))
    }

    /// `Map(inner)`.
    pub fn map(inner: Kind) -> Self {
        Kind::Map(Box::new(inner))
    }

    /// The kind a value reveals about itself.
    ///
    /// Records carry their shape; everything else is described loosely.
    pub fn of_value(value: &Value) -> Kind {
        match value {
            Value::Null => Kind::Any,
            Value::Bool(_) => Kind::Bool,
            Value::Number(n) if n.is_int() => Kind::Int,
            Value::Number(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::list(Kind::Any),
            Value::Map(_) => Kind::map(Kind::Any),
            Value::Record(r) => Kind::Record(Arc::clone(r.shape())),
        }
    }

    /// Check that `value` conforms to this kind.
    ///
    /// `path` is only used to report where a mismatch happened.
    pub fn check(&self, value: &Value, path: &Path) -> FrostResult<()> {
        let ok = match (self, value) {
            (Kind::Any, _) => true,
            (Kind::Bool, Value::Bool(_)) => true,
            (Kind::Int, Value::Number(n)) => n.is_int(),
            (Kind::Float, Value::Number(_)) => true,
            (Kind::String, Value::String(_)) => true,
            (Kind::Optional(_), Value::Null) => true,
            (Kind::Optional(inner), _) => return inner.check(value, path),
            (Kind::List(inner), Value::List(items)) => {
                for item in items.iter() {
                    inner.check(item, path)?;
                }
                true
            }
            (Kind::Map(inner), Value::Map(entries)) => {
                for (key, item) in entries.iter() {
                    inner.check(item, &path.child(key.as_str()))?;
                }
                true
            }
            (Kind::Record(shape), Value::Record(record)) => shape.accepts(record.shape()),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(FrostError::type_mismatch(
                path.clone(),
                self.to_string(),
                value.type_name(),
            ))
        }
    }

    /// Like [`check`](Kind::check), without looking inside lists and maps.
    ///
    /// Constant time for every kind; records are already checked by shape.
    pub fn check_shallow(&self, value: &Value, path: &Path) -> FrostResult<()> {
        match (self, value) {
            (Kind::Optional(_), Value::Null) => Ok(()),
            (Kind::Optional(inner), _) => inner.check_shallow(value, path),
            (Kind::List(_), Value::List(_)) | (Kind::Map(_), Value::Map(_)) => Ok(()),
            _ => self.check(value, path),
        }
    }

    /// Resolve the declared kind at `path` below this kind.
    ///
    /// Resolution is static: records answer with the field's kind, maps with
    /// their element kind for any key, optionals with their inner kind.
    pub fn at(&self, path: &Path) -> FrostResult<Kind> {
        let mut current = self;
        for (depth, seg) in path.iter().enumerate() {
            current = current.child(seg).ok_or_else(|| {
                FrostError::path_not_found(path.prefix(depth + 1))
            })?;
        }
        Ok(current.clone())
    }

    /// The kind one segment below this one, if this kind has children.
    pub fn child(&self, seg: &str) -> Option<&Kind> {
        match self {
            Kind::Any => Some(&ANY),
            Kind::Optional(inner) => inner.child(seg),
            Kind::Map(inner) => Some(inner.as_ref()),
            Kind::Record(shape) => shape.field(seg).map(|f| &f.kind),
            _ => None,
        }
    }

    /// Short name of the kind's category, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Any => "any",
            Kind::Bool => "boolean",
            Kind::Int => "integer",
            Kind::Float => "number",
            Kind::String => "string",
            Kind::Optional(_) => "optional",
            Kind::List(_) => "list",
            Kind::Map(_) => "map",
            Kind::Record(_) => "record",
        }
    }

    /// The record shape behind this kind, looking through `Optional`.
    pub fn shape(&self) -> Option<&Arc<Shape>> {
        match self {
            Kind::Record(shape) => Some(shape),
            Kind::Optional(inner) => inner.shape(),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Any => write!(f, "any"),
            Kind::Bool => write!(f, "boolean"),
            Kind::Int => write!(f, "integer"),
            Kind::Float => write!(f, "number"),
            Kind::String => write!(f, "string"),
            Kind::Optional(inner) => write!(f, "optional {inner}"),
            Kind::List(inner) => write!(f, "list of {inner}"),
            Kind::Map(inner) => write!(f, "map of {inner}"),
            Kind::Record(shape) => write!(f, "record {}", shape.name()),
        }
    }
}

/// A single declared field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDef {
    /// Field name as it appears in paths.
    pub name: String,
    /// Declared kind of the field.
    pub kind: Kind,
}

/// Declared shape of a record type.
///
/// # Examples
///
/// ```
/// use frost_state::{Kind, Shape};
///
/// let player = Shape::builder("Player")
///     .field("firstName", Kind::String)
///     .field("lastName", Kind::String)
///     .build()
///     .unwrap();
///
/// assert_eq!(player.len(), 2);
/// assert_eq!(player.position("lastName"), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    name: String,
    fields: Vec<FieldDef>,
}

impl Shape {
    /// Start building a shape.
    pub fn builder(name: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Name of the record type.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Number of declared fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the shape declares no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of a field in declaration order.
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Look up a field by name.
    #[inline]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a record built for `other` may stand where `self` is declared.
    #[inline]
    pub fn accepts(&self, other: &Shape) -> bool {
        std::ptr::eq(self, other) || self == other
    }
}

/// Builder for [`Shape`].
#[derive(Debug)]
pub struct ShapeBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl ShapeBuilder {
    /// Declare the next field.
    pub fn field(mut self, name: impl Into<String>, kind: Kind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
        });
        self
    }

    /// Finish the shape, rejecting unusable or duplicate field names.
    pub fn build(self) -> FrostResult<Arc<Shape>> {
        for (i, field) in self.fields.iter().enumerate() {
            let path = Path::root().key(field.name.as_str());
            if field.name.is_empty() || field.name == ROOT || field.name.contains('.') {
                return Err(FrostError::invalid_path(
                    path.to_string(),
                    format!("`{}` is not a usable field name", field.name),
                ));
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(FrostError::invalid_path(
                    path.to_string(),
                    format!("field declared twice on {}", self.name),
                ));
            }
        }
        Ok(self.build_unchecked())
    }

    /// Finish without validation. Used by generated code, which validates
    /// field names at compile time.
    #[doc(hidden)]
    pub fn build_unchecked(self) -> Arc<Shape> {
        Arc::new(Shape {
            name: self.name,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn player() -> Arc<Shape> {
        Shape::builder("Player")
            .field("firstName", Kind::String)
            .field("lastName", Kind::String)
            .build()
            .unwrap()
    }

    fn game() -> Arc<Shape> {
        Shape::builder("Game")
            .field("score", Kind::Int)
            .field("player", Kind::Record(player()))
            .field("tags", Kind::map(Kind::Int))
            .field("coach", Kind::optional(Kind::Record(player())))
            .build()
            .unwrap()
    }

    #[test]
    fn test_kind_at_resolves_statically() {
        let root = Kind::Record(game());
        assert_eq!(root.at(&path!("score")).unwrap(), Kind::Int);
        assert_eq!(root.at(&path!("player", "firstName")).unwrap(), Kind::String);
        assert_eq!(root.at(&path!("tags", "anything")).unwrap(), Kind::Int);
        assert_eq!(root.at(&path!("coach", "lastName")).unwrap(), Kind::String);
        assert_eq!(root.at(&path!()).unwrap(), root);
    }

    #[test]
    fn test_kind_at_reports_first_unresolvable_segment() {
        let root = Kind::Record(game());
        match root.at(&path!("player", "middleName", "x")).unwrap_err() {
            FrostError::PathNotFound { path } => assert_eq!(path, path!("player", "middleName")),
            other => panic!("unexpected error: {other:?}"),
        }
        match root.at(&path!("score", "digits")).unwrap_err() {
            FrostError::PathNotFound { path } => assert_eq!(path, path!("score", "digits")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_scalars() {
        let p = Path::root();
        assert!(Kind::Int.check(&Value::from(3), &p).is_ok());
        assert!(Kind::Int.check(&Value::from(3.5), &p).is_err());
        assert!(Kind::Float.check(&Value::from(3), &p).is_ok());
        assert!(Kind::String.check(&Value::from("x"), &p).is_ok());
        assert!(Kind::optional(Kind::String).check(&Value::Null, &p).is_ok());
        assert!(Kind::String.check(&Value::Null, &p).is_err());
        assert!(Kind::Any.check(&Value::Null, &p).is_ok());
    }

    #[test]
    fn test_check_map_elements_reports_key() {
        let value = Value::map([("a", Value::from(1)), ("b", Value::from("two"))]);
        let err = Kind::map(Kind::Int).check(&value, &path!("tags")).unwrap_err();
        match err {
            FrostError::TypeMismatch {
                path,
                expected,
                found,
            } => {
                assert_eq!(path, path!("tags", "b"));
                assert_eq!(expected, "integer");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_record_compares_shapes() {
        let record = crate::Record::from_fields(
            player(),
            [("firstName", Value::from("Wall")), ("lastName", Value::from("Enberg"))],
        )
        .unwrap();
        assert!(Kind::Record(player()).check(&record.clone().into(), &path!()).is_ok());

        let other = Shape::builder("Coach").field("name", Kind::String).build().unwrap();
        assert!(Kind::Record(other).check(&record.into(), &path!()).is_err());
    }

    #[test]
    fn test_builder_rejects_duplicates_and_reserved_names() {
        assert!(Shape::builder("X")
            .field("a", Kind::Int)
            .field("a", Kind::Int)
            .build()
            .is_err());
        assert!(Shape::builder("X").field("$", Kind::Int).build().is_err());
        assert!(Shape::builder("X").field("", Kind::Int).build().is_err());
        assert!(Shape::builder("X").field("a.b", Kind::Int).build().is_err());
    }

    #[test]
    fn test_check_shallow_stops_at_the_root() {
        let ints = Kind::list(Kind::Int);
        let mixed = Value::list([Value::from(1), Value::from("two")]);
        assert!(ints.check(&mixed, &path!()).is_err());
        assert!(ints.check_shallow(&mixed, &path!()).is_ok());
        assert!(ints.check_shallow(&Value::from(1), &path!()).is_err());

        let maybe = Kind::optional(Kind::map(Kind::Int));
        assert!(maybe.check_shallow(&Value::Null, &path!()).is_ok());
        assert!(maybe.check_shallow(&Value::map([("a", Value::from("x"))]), &path!()).is_ok());
        assert!(maybe.check_shallow(&Value::from("x"), &path!()).is_err());

        let other = Shape::builder("Other").field("x", Kind::Int).build().unwrap();
        let record = crate::Record::from_parts(player(), vec![Value::from("a"), Value::from("b")]);
        assert!(Kind::Record(other).check_shallow(&record.into(), &path!()).is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::list(Kind::String).to_string(), "list of string");
        assert_eq!(Kind::Record(player()).to_string(), "record Player");
        assert_eq!(Kind::optional(Kind::Int).to_string(), "optional integer");
    }
}

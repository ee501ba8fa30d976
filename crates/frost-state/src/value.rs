//! Persistent state values.
//!
//! A [`Value`] is an immutable tree whose containers are reference counted.
//! Cloning a value never copies a container; it bumps an `Arc`. The
//! structural updater relies on this: a new root shares every untouched
//! subtree with the old one, and [`Value::ptr_eq`] observes that sharing.

use crate::error::{FrostError, FrostResult};
use crate::shape::{Kind, Shape};
use crate::Path;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A numeric value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
}

impl Number {
    /// Convert to f64.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    /// The integer, if this is one.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(*i),
            Number::Float(_) => None,
        }
    }

    /// Check if this is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Number::Int(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A record: fixed named fields described by a shared [`Shape`].
///
/// Field values are stored in declaration order behind one `Arc`, so a
/// record is copied by cloning its field slots (each slot is itself a cheap
/// clone) and replacing the ones that change.
#[derive(Clone)]
pub struct Record {
    shape: Arc<Shape>,
    fields: Arc<[Value]>,
}

impl Record {
    /// Create a record from field values in declaration order.
    ///
    /// Every value is checked against its declared kind.
    pub fn new(shape: Arc<Shape>, fields: Vec<Value>) -> FrostResult<Self> {
        if let Some(missing) = shape.fields().get(fields.len()) {
            return Err(FrostError::missing_field(shape.name(), missing.name.as_str()));
        }
        if fields.len() > shape.len() {
            return Err(FrostError::type_mismatch(
                Path::root(),
                format!("record {} with {} fields", shape.name(), shape.len()),
                "record",
            ));
        }
        for (def, value) in shape.fields().iter().zip(&fields) {
            def.kind.check(value, &Path::root().key(def.name.as_str()))?;
        }
        Ok(Self::from_parts(shape, fields))
    }

    /// Create a record from `(name, value)` pairs in any order.
    ///
    /// Fails with `UnknownField` for names the shape does not declare and
    /// `MissingField` for declared fields left out.
    pub fn from_fields<K, I>(shape: Arc<Shape>, pairs: I) -> FrostResult<Self>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; shape.len()];
        for (name, value) in pairs {
            let name = name.as_ref();
            let idx = shape
                .position(name)
                .ok_or_else(|| FrostError::unknown_field(Path::root(), name, shape.name()))?;
            slots[idx] = Some(value);
        }
        let mut fields = Vec::with_capacity(slots.len());
        for (def, slot) in shape.fields().iter().zip(slots) {
            match slot {
                Some(value) => fields.push(value),
                None => return Err(FrostError::missing_field(shape.name(), def.name.as_str())),
            }
        }
        Self::new(shape, fields)
    }

    /// Assemble a record without checking field kinds.
    ///
    /// The caller guarantees `fields` matches `shape` in length and kinds;
    /// generated `State` impls use this since the type system already did.
    #[doc(hidden)]
    pub fn from_parts(shape: Arc<Shape>, fields: Vec<Value>) -> Self {
        Self {
            shape,
            fields: fields.into(),
        }
    }

    /// The record's shape.
    #[inline]
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Look up a field by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.shape.position(name).map(|idx| &self.fields[idx])
    }

    /// Field values in declaration order.
    #[inline]
    pub fn values(&self) -> &[Value] {
        &self.fields
    }

    /// Iterate over `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.shape
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.fields.iter())
    }

    /// A new record of the same shape holding `fields`.
    #[inline]
    pub(crate) fn with_values(&self, fields: Vec<Value>) -> Self {
        Self {
            shape: Arc::clone(&self.shape),
            fields: fields.into(),
        }
    }

    /// Whether two records share the same field storage.
    #[inline]
    pub fn ptr_eq(a: &Record, b: &Record) -> bool {
        Arc::ptr_eq(&a.fields, &b.fields)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Record::ptr_eq(self, other)
            || (self.shape.accepts(&other.shape) && self.fields == other.fields)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.shape.name());
        for (name, value) in self.iter() {
            s.field(name, value);
        }
        s.finish()
    }
}

/// An immutable state value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absent / none.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(Number),
    /// String.
    String(Arc<str>),
    /// Ordered sequence, addressed only as a whole.
    List(Arc<Vec<Value>>),
    /// Record with declared fields.
    Record(Record),
    /// Associative container with dynamic keys.
    Map(Arc<BTreeMap<String, Value>>),
}

impl Value {
    /// Build a map value from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build a list value.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(Arc::new(items.into_iter().collect()))
    }

    /// Reference identity.
    ///
    /// Containers and strings are identical when they share storage;
    /// scalars have no identity and compare by value.
    pub fn ptr_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::String(x), Value::String(y)) => Arc::ptr_eq(x, y),
            (Value::List(x), Value::List(y)) => Arc::ptr_eq(x, y),
            (Value::Map(x), Value::Map(y)) => Arc::ptr_eq(x, y),
            (Value::Record(x), Value::Record(y)) => Record::ptr_eq(x, y),
            (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => x == y,
            _ => false,
        }
    }

    /// One navigation step: a record field or a map key.
    ///
    /// Returns `None` for missing names and for values that are not
    /// containers (lists are leaves).
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(r) => r.get(name),
            Value::Map(m) => m.get(name),
            _ => None,
        }
    }

    /// Whether this value can be navigated into.
    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Record(_) | Value::Map(_))
    }

    /// Whether this is `Null`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// The number as `f64`, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// The list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The record, if this is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// The map entries, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m.as_ref()),
            _ => None,
        }
    }

    /// Get the type name of a value, for error messages.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(Number::Int(_)) => "integer",
            Value::Number(Number::Float(_)) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Map(_) => "map",
        }
    }

    /// Build a value from JSON, directed by the declared kind.
    ///
    /// Records need their shape to be rebuilt; optional record fields that
    /// are absent from the JSON object become `Null`.
    ///
    /// ```
    /// use frost_state::{Kind, Value};
    /// use serde_json::json;
    ///
    /// let v = Value::from_json(&json!({"a": 1}), &Kind::map(Kind::Int)).unwrap();
    /// assert_eq!(v.get("a").and_then(Value::as_i64), Some(1));
    /// ```
    pub fn from_json(json: &serde_json::Value, kind: &Kind) -> FrostResult<Self> {
        from_json_at(json, kind, &Path::root())
    }

    /// Convert to plain JSON. Records become objects in field order.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(Number::Int(i)) => serde_json::Value::from(*i),
            Value::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::List(items) => items.iter().map(Value::to_json).collect(),
            Value::Record(r) => serde_json::Value::Object(
                r.iter().map(|(k, v)| (k.to_owned(), v.to_json())).collect(),
            ),
            Value::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

fn from_json_at(json: &serde_json::Value, kind: &Kind, path: &Path) -> FrostResult<Value> {
    use serde_json::Value as Json;

    let mismatch = || FrostError::type_mismatch(path.clone(), kind.to_string(), json_type_name(json));

    match (kind, json) {
        (Kind::Optional(_), Json::Null) => Ok(Value::Null),
        (Kind::Optional(inner), _) => from_json_at(json, inner, path),
        (Kind::Any, _) => Ok(any_from_json(json)),
        (Kind::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (Kind::Int, Json::Number(n)) => n.as_i64().map(Value::from).ok_or_else(mismatch),
        (Kind::Float, Json::Number(n)) => n.as_f64().map(Value::from).ok_or_else(mismatch),
        (Kind::String, Json::String(s)) => Ok(Value::from(s.as_str())),
        (Kind::List(inner), Json::Array(items)) => items
            .iter()
            .map(|item| from_json_at(item, inner, path))
            .collect::<FrostResult<Vec<_>>>()
            .map(Value::list),
        (Kind::Map(inner), Json::Object(obj)) => {
            let mut entries = BTreeMap::new();
            for (key, item) in obj {
                entries.insert(key.clone(), from_json_at(item, inner, &path.child(key.as_str()))?);
            }
            Ok(Value::Map(Arc::new(entries)))
        }
        (Kind::Record(shape), Json::Object(obj)) => {
            if let Some(unknown) = obj.keys().find(|k| shape.field(k).is_none()) {
                return Err(FrostError::unknown_field(path.clone(), unknown.as_str(), shape.name()));
            }
            let mut fields = Vec::with_capacity(shape.len());
            for def in shape.fields() {
                let field_path = path.child(def.name.as_str());
                match obj.get(&def.name) {
                    Some(item) => fields.push(from_json_at(item, &def.kind, &field_path)?),
                    None if matches!(def.kind, Kind::Optional(_)) => fields.push(Value::Null),
                    None => return Err(FrostError::missing_field(shape.name(), def.name.as_str())),
                }
            }
            Ok(Value::Record(Record::from_parts(Arc::clone(shape), fields)))
        }
        _ => Err(mismatch()),
    }
}

fn any_from_json(json: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::list(items.iter().map(any_from_json)),
        Json::Object(obj) => Value::map(obj.iter().map(|(k, v)| (k.clone(), any_from_json(v)))),
    }
}

fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(r) => {
                let mut map = serializer.serialize_map(Some(r.values().len()))?;
                for (name, value) in r.iter() {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Value::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (key, value) in m.iter() {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(Number::Int(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(Number::Int(v as i64))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(Number::Float(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Record(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(Arc::new(v))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(Arc::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn player_shape() -> Arc<Shape> {
        Shape::builder("Player")
            .field("firstName", Kind::String)
            .field("lastName", Kind::String)
            .field("nickname", Kind::optional(Kind::String))
            .build()
            .unwrap()
    }

    #[test]
    fn test_clone_shares_containers() {
        let v = Value::map([("a", Value::list([Value::from(1)]))]);
        let copy = v.clone();
        assert!(Value::ptr_eq(&v, &copy));
        assert!(Value::ptr_eq(v.get("a").unwrap(), copy.get("a").unwrap()));
    }

    #[test]
    fn test_equal_but_not_identical() {
        let a = Value::map([("a", Value::from(1))]);
        let b = Value::map([("a", Value::from(1))]);
        assert_eq!(a, b);
        assert!(!Value::ptr_eq(&a, &b));
    }

    #[test]
    fn test_record_from_fields_any_order() {
        let r = Record::from_fields(
            player_shape(),
            [
                ("nickname", Value::Null),
                ("lastName", Value::from("Enberg")),
                ("firstName", Value::from("Wall")),
            ],
        )
        .unwrap();
        assert_eq!(r.get("firstName").and_then(Value::as_str), Some("Wall"));
        assert_eq!(r.values().len(), 3);
    }

    #[test]
    fn test_record_from_fields_errors() {
        let err = Record::from_fields(player_shape(), [("firstName", Value::from("Wall"))])
            .unwrap_err();
        assert!(matches!(err, FrostError::MissingField { .. }));

        let err = Record::from_fields(player_shape(), [("middleName", Value::from("X"))])
            .unwrap_err();
        assert!(matches!(err, FrostError::UnknownField { .. }));
    }

    #[test]
    fn test_record_new_checks_kinds() {
        let err = Record::new(
            player_shape(),
            vec![Value::from(1), Value::from("Enberg"), Value::Null],
        )
        .unwrap_err();
        match err {
            FrostError::TypeMismatch { path, .. } => assert_eq!(path.to_string(), "$.firstName"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_round_trip_through_kind() {
        let kind = Kind::Record(player_shape());
        let json = json!({"firstName": "Wall", "lastName": "Enberg"});
        let value = Value::from_json(&json, &kind).unwrap();
        assert!(value.get("nickname").unwrap().is_null());
        assert_eq!(
            value.to_json(),
            json!({"firstName": "Wall", "lastName": "Enberg", "nickname": null})
        );
    }

    #[test]
    fn test_from_json_rejects_unknown_and_mistyped() {
        let kind = Kind::Record(player_shape());
        let err = Value::from_json(&json!({"firstName": "a", "lastName": "b", "x": 1}), &kind)
            .unwrap_err();
        assert!(matches!(err, FrostError::UnknownField { .. }));

        let err = Value::from_json(&json!({"firstName": 1, "lastName": "b"}), &kind).unwrap_err();
        assert!(matches!(err, FrostError::TypeMismatch { .. }));
    }

    #[test]
    fn test_serialize_record_in_field_order() {
        let r = Record::from_fields(
            player_shape(),
            [
                ("firstName", Value::from("Wall")),
                ("lastName", Value::from("Enberg")),
                ("nickname", Value::Null),
            ],
        )
        .unwrap();
        let text = serde_json::to_string(&Value::from(r)).unwrap();
        assert_eq!(text, r#"{"firstName":"Wall","lastName":"Enberg","nickname":null}"#);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(1).type_name(), "integer");
        assert_eq!(Value::from(1.5).type_name(), "number");
        assert_eq!(Value::list([]).type_name(), "list");
        assert_eq!(Value::map::<String, _>([]).type_name(), "map");
    }
}

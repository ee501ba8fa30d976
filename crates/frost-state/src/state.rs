//! State trait for typed access to state values.
//!
//! The `State` trait connects a Rust type to the value model: its declared
//! [`Kind`], conversions to and from [`Value`], and the lens type used to
//! address its fields. It is typically implemented via `#[derive(State)]`;
//! implementations for scalars, `Option`, `Vec`, `BTreeMap<String, _>` and
//! [`Value`] itself are provided here.

use crate::error::{FrostError, FrostResult};
use crate::lens::{Focus, Lens};
use crate::shape::Kind;
use crate::{Path, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for types that can live in a state tree.
///
/// # Example
///
/// ```
/// use frost_state::{Focus, State};
///
/// #[derive(Debug, Clone, PartialEq, State)]
/// struct Player {
///     #[frost(rename = "firstName")]
///     first_name: String,
///     #[frost(rename = "lastName")]
///     last_name: String,
/// }
///
/// let lens = Player::lens().first_name();
/// assert_eq!(lens.path().to_string(), "$.firstName");
/// ```
pub trait State: Sized {
    /// Lens type addressing a value of this type inside a root `S`.
    ///
    /// Leaf types use [`Lens<S, Self>`]; records get a generated lens with
    /// one method per field.
    type Focused<S>: Focus<S, Target = Self>;

    /// Declared kind of this type.
    fn kind() -> Kind;

    /// Convert to a state value.
    fn to_value(&self) -> Value;

    /// Convert from a state value.
    fn from_value(value: &Value) -> FrostResult<Self>;

    /// Wrap an untyped lens in this type's lens.
    fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S>;

    /// The lens addressing a root of this type.
    fn lens() -> Self::Focused<Self> {
        Self::focus(Lens::root())
    }
}

fn mismatch(expected: impl Into<String>, value: &Value) -> FrostError {
    FrostError::type_mismatch(Path::root(), expected, value.type_name())
}

impl State for Value {
    type Focused<S> = Lens<S, Self>;

    fn kind() -> Kind {
        Kind::Any
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> FrostResult<Self> {
        Ok(value.clone())
    }

    fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
        lens
    }
}

impl State for bool {
    type Focused<S> = Lens<S, Self>;

    fn kind() -> Kind {
        Kind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> FrostResult<Self> {
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }

    fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
        lens
    }
}

macro_rules! impl_state_for_int {
    ($($ty:ty),*) => {
        $(
            impl State for $ty {
                type Focused<S> = Lens<S, Self>;

                fn kind() -> Kind {
                    Kind::Int
                }

                fn to_value(&self) -> Value {
                    Value::from(i64::from(*self))
                }

                fn from_value(value: &Value) -> FrostResult<Self> {
                    value
                        .as_i64()
                        .and_then(|i| <$ty>::try_from(i).ok())
                        .ok_or_else(|| mismatch(concat!("integer (", stringify!($ty), ")"), value))
                }

                fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
                    lens
                }
            }
        )*
    };
}

impl_state_for_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_state_for_float {
    ($($ty:ty),*) => {
        $(
            impl State for $ty {
                type Focused<S> = Lens<S, Self>;

                fn kind() -> Kind {
                    Kind::Float
                }

                fn to_value(&self) -> Value {
                    Value::from(f64::from(*self))
                }

                fn from_value(value: &Value) -> FrostResult<Self> {
                    value
                        .as_f64()
                        .map(|f| f as $ty)
                        .ok_or_else(|| mismatch("number", value))
                }

                fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
                    lens
                }
            }
        )*
    };
}

impl_state_for_float!(f32, f64);

impl State for String {
    type Focused<S> = Lens<S, Self>;

    fn kind() -> Kind {
        Kind::String
    }

    fn to_value(&self) -> Value {
        Value::from(self.as_str())
    }

    fn from_value(value: &Value) -> FrostResult<Self> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| mismatch("string", value))
    }

    fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
        lens
    }
}

impl<T: State> State for Option<T> {
    type Focused<S> = Lens<S, Self>;

    fn kind() -> Kind {
        Kind::optional(T::kind())
    }

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> FrostResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
        lens
    }
}

impl<T: State> State for Vec<T> {
    type Focused<S> = Lens<S, Self>;

    fn kind() -> Kind {
        Kind::list(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::list(self.iter().map(State::to_value))
    }

    fn from_value(value: &Value) -> FrostResult<Self> {
        let items = value
            .as_list()
            .ok_or_else(|| mismatch(Self::kind().to_string(), value))?;
        items.iter().map(T::from_value).collect()
    }

    fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
        lens
    }
}

impl<T: State> State for BTreeMap<String, T> {
    type Focused<S> = Lens<S, Self>;

    fn kind() -> Kind {
        Kind::map(T::kind())
    }

    fn to_value(&self) -> Value {
        Value::Map(Arc::new(
            self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect(),
        ))
    }

    fn from_value(value: &Value) -> FrostResult<Self> {
        let entries = value
            .as_map()
            .ok_or_else(|| mismatch(Self::kind().to_string(), value))?;
        entries
            .iter()
            .map(|(k, v)| {
                T::from_value(v)
                    .map(|item| (k.clone(), item))
                    .map_err(|e| e.with_prefix(&Path::root().key(k.as_str())))
            })
            .collect()
    }

    fn focus<S>(lens: Lens<S, Self>) -> Self::Focused<S> {
        lens
    }
}

use serde_derive::Deserialize;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;
use uuid::Uuid;

/// A positional SQL argument.
///
/// Scalars cover the filterable column types; arrays carry the key set of a
/// batched `= any($1)` load.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    IntArray(Vec<i32>),
    BigIntArray(Vec<i64>),
    TextArray(Vec<String>),
    UuidArray(Vec<Uuid>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn bind<'q>(&self, query: Query<'q, Postgres, PgArguments>) -> Query<'q, Postgres, PgArguments> {
        match self {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::Int(v) => query.bind(*v),
            Value::BigInt(v) => query.bind(*v),
            Value::Float(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Uuid(v) => query.bind(*v),
            Value::IntArray(v) => query.bind(v.clone()),
            Value::BigIntArray(v) => query.bind(v.clone()),
            Value::TextArray(v) => query.bind(v.clone()),
            Value::UuidArray(v) => query.bind(v.clone()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    i64 => BigInt,
    f64 => Float,
    String => Text,
    Uuid => Uuid,
    Vec<i32> => IntArray,
    Vec<i64> => BigIntArray,
    Vec<String> => TextArray,
    Vec<Uuid> => UuidArray,
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v.into())
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_scalars() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 1, 3000000000, 1.5, "x"]"#).unwrap();

        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(1),
                Value::BigInt(3_000_000_000),
                Value::Float(1.5),
                Value::Text("x".into()),
            ]
        );
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(7i16)), Value::Int(7));
    }
}

use super::value::Value;
use crate::error::{Error, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use std::hash::Hash;
use std::sync::Arc;
use uuid::Uuid;

/// Executes SQL text with positional arguments. The only capability the
/// runtime needs from a database.
#[async_trait]
pub trait Queryer: Send + Sync + 'static {
    type Row: Send + 'static;

    async fn fetch_all(&self, sql: &str, args: &[Value]) -> Result<Vec<Self::Row>>;
}

#[async_trait]
impl Queryer for PgPool {
    type Row = PgRow;

    async fn fetch_all(&self, sql: &str, args: &[Value]) -> Result<Vec<PgRow>> {
        let query = args
            .iter()
            .fold(sqlx::query(sql), |query, arg: &Value| arg.bind(query));

        Ok(query.fetch_all(self).await?)
    }
}

#[async_trait]
impl<Q: Queryer> Queryer for Arc<Q> {
    type Row = Q::Row;

    async fn fetch_all(&self, sql: &str, args: &[Value]) -> Result<Vec<Self::Row>> {
        (**self).fetch_all(sql, args).await
    }
}

/// Maps a row onto a typed record. Generated records implement this with a
/// fixed column index per field.
pub trait FromRow<Row>: Sized {
    fn from_row(row: &Row) -> Result<Self>;
}

/// Decodes column `index` of a Postgres row, naming the column on failure.
pub fn decode<'r, T>(row: &'r PgRow, index: usize, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(index).map_err(|source: sqlx::Error| Error::Decode {
        column: column.to_owned(),
        source,
    })
}

pub async fn fetch_all<Q, R>(queryer: &Q, sql: &str, args: &[Value]) -> Result<Vec<R>>
where
    Q: Queryer,
    R: FromRow<Q::Row>,
{
    queryer
        .fetch_all(sql, args)
        .await?
        .iter()
        .map(R::from_row)
        .collect()
}

pub async fn fetch_optional<Q, R>(queryer: &Q, sql: &str, args: &[Value]) -> Result<Option<R>>
where
    Q: Queryer,
    R: FromRow<Q::Row>,
{
    let rows: Vec<R> = fetch_all(queryer, sql, args).await?;
    Ok(rows.into_iter().next())
}

/// A scalar usable as a batched loader key.
pub trait LoaderKey: Clone + Eq + Hash + Send + Sync + 'static {
    /// The single array argument of `key = any($1)`.
    fn to_array(keys: &[Self]) -> Value;
}

impl LoaderKey for i16 {
    fn to_array(keys: &[Self]) -> Value {
        Value::IntArray(keys.iter().map(|key: &i16| i32::from(*key)).collect())
    }
}

impl LoaderKey for i32 {
    fn to_array(keys: &[Self]) -> Value {
        Value::IntArray(keys.to_vec())
    }
}

impl LoaderKey for i64 {
    fn to_array(keys: &[Self]) -> Value {
        Value::BigIntArray(keys.to_vec())
    }
}

impl LoaderKey for String {
    fn to_array(keys: &[Self]) -> Value {
        Value::TextArray(keys.to_vec())
    }
}

impl LoaderKey for Uuid {
    fn to_array(keys: &[Self]) -> Value {
        Value::UuidArray(keys.to_vec())
    }
}

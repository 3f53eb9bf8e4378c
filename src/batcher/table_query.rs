use super::loader::BatchFn;
use crate::error::Result;
use crate::sql::{FromRow, LoaderKey, Queryer};
use async_trait::async_trait;
use std::marker::PhantomData;
use tracing::trace;

/// Loads rows of one table by one key column:
/// `select <columns> from <table> where 1=1 and <key> = any($1)`.
pub struct TableQuery<Q, K, R> {
    queryer: Q,
    sql: String,
    indexer: fn(&R) -> Option<K>,
    _marker: PhantomData<fn() -> (K, R)>,
}

impl<Q, K, R> TableQuery<Q, K, R> {
    /// `indexer` reads the key column back out of a loaded record; records
    /// whose key is NULL are dropped.
    pub fn new(queryer: Q, sql: impl Into<String>, indexer: fn(&R) -> Option<K>) -> Self {
        Self {
            queryer,
            sql: sql.into(),
            indexer,
            _marker: PhantomData,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[async_trait]
impl<Q, K, R> BatchFn<K, R> for TableQuery<Q, K, R>
where
    Q: Queryer,
    K: LoaderKey,
    R: FromRow<Q::Row> + Send + 'static,
{
    async fn load(&self, keys: &[K]) -> Result<Vec<(K, R)>> {
        trace!(sql = %self.sql, keys = keys.len(), "batched query");

        let args = [K::to_array(keys)];
        let rows = self.queryer.fetch_all(&self.sql, &args).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows.iter() {
            let record = R::from_row(row)?;
            if let Some(key) = (self.indexer)(&record) {
                records.push((key, record));
            }
        }

        Ok(records)
    }
}

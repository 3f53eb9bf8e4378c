/// How rows sharing a key collapse into the per-key value of a loader.
pub trait Cardinality<R>: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    /// The value of a key with no matching row.
    fn empty() -> Self::Value;

    fn push(slot: &mut Self::Value, row: R);
}

/// One row per key. Duplicate key values are not expected; the last row wins.
pub struct ToOne;

impl<R: Clone + Send + Sync + 'static> Cardinality<R> for ToOne {
    type Value = Option<R>;

    fn empty() -> Self::Value {
        None
    }

    fn push(slot: &mut Self::Value, row: R) {
        *slot = Some(row);
    }
}

/// Every row of a key, in result-set order.
pub struct ToMany;

impl<R: Clone + Send + Sync + 'static> Cardinality<R> for ToMany {
    type Value = Vec<R>;

    fn empty() -> Self::Value {
        Vec::new()
    }

    fn push(slot: &mut Self::Value, row: R) {
        slot.push(row);
    }
}

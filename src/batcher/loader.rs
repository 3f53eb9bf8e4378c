use super::cardinality::{Cardinality, ToMany, ToOne};
use super::scope::RequestScope;
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// Fetches the rows of a batch of keys, each row paired with its key.
#[async_trait]
pub trait BatchFn<K, R>: Send + Sync + 'static {
    async fn load(&self, keys: &[K]) -> Result<Vec<(K, R)>>;
}

pub type LoadResult<V> = std::result::Result<V, Arc<Error>>;

pub type OneLoader<K, R> = Loader<K, R, ToOne>;
pub type ManyLoader<K, R> = Loader<K, R, ToMany>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    AccumulatingKeys,
    BatchDispatched,
    SettledSuccess,
    SettledError,
}

/// Coalesces the point lookups of one request into batched fetches.
///
/// Keys requested while a batch is accumulating join that batch, and all
/// callers of a key are released together once it settles. A key already in
/// a fetch that is in flight waits for that fetch; any other key opens the
/// next window. Settled results are cached for the lifetime of the loader,
/// which must therefore not outlive its request.
pub struct Loader<K, R, C = ToOne>
where
    C: Cardinality<R>,
{
    inner: Arc<Inner<K, R, C>>,
}

impl<K, R, C: Cardinality<R>> Clone for Loader<K, R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<K, R, C: Cardinality<R>> {
    fetch: Box<dyn BatchFn<K, R>>,
    scope: RequestScope,
    state: Mutex<State<K, C::Value>>,
    _cardinality: PhantomData<fn() -> C>,
}

struct State<K, V> {
    queued: Vec<K>,
    waiters: HashMap<K, Vec<oneshot::Sender<LoadResult<V>>>>,
    settled: HashMap<K, LoadResult<V>>,
    in_flight: usize,
    last_outcome: Option<bool>,
    round_trips: usize,
}

impl<K, V> Default for State<K, V> {
    fn default() -> Self {
        Self {
            queued: Vec::new(),
            waiters: HashMap::new(),
            settled: HashMap::new(),
            in_flight: 0,
            last_outcome: None,
            round_trips: 0,
        }
    }
}

impl<K, R, C> Loader<K, R, C>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    R: Send + 'static,
    C: Cardinality<R>,
{
    pub fn new(fetch: impl BatchFn<K, R>, scope: &RequestScope) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetch: Box::new(fetch),
                scope: scope.clone(),
                state: Mutex::new(State::default()),
                _cardinality: PhantomData,
            }),
        }
    }

    /// Resolves `key` once the batch it lands in settles. A key without rows
    /// resolves to the empty value; a failed batch fails every key in it.
    pub async fn load(&self, key: K) -> LoadResult<C::Value> {
        let slot = self.register(&mut self.inner.state.lock(), key);
        slot.wait().await
    }

    /// Loads several keys into the same batch. Results follow `keys` order.
    pub async fn load_many(&self, keys: impl IntoIterator<Item = K>) -> Vec<LoadResult<C::Value>> {
        let slots: Vec<Slot<C::Value>> = {
            let mut state = self.inner.state.lock();
            keys.into_iter()
                .map(|key: K| self.register(&mut state, key))
                .collect()
        };

        let mut results = Vec::with_capacity(slots.len());
        for slot in slots {
            results.push(slot.wait().await);
        }
        results
    }

    fn register(&self, state: &mut State<K, C::Value>, key: K) -> Slot<C::Value> {
        if let Some(settled) = state.settled.get(&key) {
            return Slot::Ready(settled.clone());
        }

        let (sender, receiver) = oneshot::channel();

        if let Some(waiters) = state.waiters.get_mut(&key) {
            waiters.push(sender);
        } else {
            state.waiters.insert(key.clone(), vec![sender]);
            state.queued.push(key);

            if state.queued.len() == 1 {
                tokio::spawn(Arc::clone(&self.inner).dispatch());
            }
        }

        Slot::Pending(receiver)
    }

    pub fn state(&self) -> BatchState {
        let state = self.inner.state.lock();

        if !state.queued.is_empty() {
            BatchState::AccumulatingKeys
        } else if state.in_flight > 0 {
            BatchState::BatchDispatched
        } else {
            match state.last_outcome {
                None => BatchState::Idle,
                Some(true) => BatchState::SettledSuccess,
                Some(false) => BatchState::SettledError,
            }
        }
    }

    /// Number of fetches issued so far.
    pub fn round_trips(&self) -> usize {
        self.inner.state.lock().round_trips
    }
}

impl<K, R, C> Inner<K, R, C>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    R: Send + 'static,
    C: Cardinality<R>,
{
    async fn dispatch(self: Arc<Self>) {
        let config = self.scope.config();
        if config.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(config.delay).await;
        }

        let keys = {
            let mut state = self.state.lock();
            state.in_flight += 1;
            mem::take(&mut state.queued)
        };

        let chunk_size = config.max_batch_size.unwrap_or(keys.len()).max(1);
        for chunk in keys.chunks(chunk_size) {
            debug!(keys = chunk.len(), "dispatching batch");

            let result = if self.scope.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                self.state.lock().round_trips += 1;
                tokio::select! {
                    biased;
                    _ = self.scope.cancelled() => Err(Error::Cancelled),
                    result = self.fetch.load(chunk) => result,
                }
            };

            self.settle(chunk, result);
        }

        self.state.lock().in_flight -= 1;
    }

    fn settle(&self, keys: &[K], result: Result<Vec<(K, R)>>) {
        let mut state = self.state.lock();

        match result {
            Ok(rows) => {
                let mut index: HashMap<K, C::Value> = HashMap::with_capacity(keys.len());
                for (key, row) in rows {
                    C::push(index.entry(key).or_insert_with(C::empty), row);
                }

                for key in keys {
                    let value = index.remove(key).unwrap_or_else(C::empty);
                    state.resolve(key, Ok(value));
                }
                state.last_outcome = Some(true);
            }
            Err(err) => {
                debug!(error = %err, keys = keys.len(), "batch failed");

                let err = Arc::new(err);
                for key in keys {
                    state.resolve(key, Err(Arc::clone(&err)));
                }
                state.last_outcome = Some(false);
            }
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone> State<K, V> {
    fn resolve(&mut self, key: &K, result: LoadResult<V>) {
        for waiter in self.waiters.remove(key).unwrap_or_default() {
            // A dropped receiver only means that caller stopped waiting.
            let _ = waiter.send(result.clone());
        }
        self.settled.insert(key.clone(), result);
    }
}

enum Slot<V> {
    Ready(LoadResult<V>),
    Pending(oneshot::Receiver<LoadResult<V>>),
}

impl<V> Slot<V> {
    async fn wait(self) -> LoadResult<V> {
        match self {
            Slot::Ready(result) => result,
            Slot::Pending(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(Arc::new(Error::Cancelled))),
        }
    }
}

use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};

#[derive(Clone, Debug)]
pub struct LoaderConfig {
    /// How long a batch keeps accumulating keys after its first key arrives.
    /// Zero dispatches after a single cooperative yield.
    pub delay: Duration,
    /// Split a window into several queries above this many keys.
    pub max_batch_size: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1),
            max_batch_size: None,
        }
    }
}

/// State shared by every loader of one client request.
///
/// Build one per request; cancelling it fails every pending batch of the
/// request's loaders with [`Error::Cancelled`](crate::Error::Cancelled).
#[derive(Clone, Debug, Default)]
pub struct RequestScope {
    cancel: CancellationToken,
    config: LoaderConfig,
}

impl RequestScope {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            cancel: CancellationToken::new(),
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Cancels the scope when the returned guard is dropped, e.g. together
    /// with an abandoned request future.
    pub fn drop_guard(&self) -> DropGuard {
        self.cancel.clone().drop_guard()
    }
}

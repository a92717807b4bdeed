//! Shared, observable handles to the action store and a log buffer.
//!
//! Both wrap their data in an `Arc<RwLock<_>>` and publish a change
//! counter on a [`watch`] channel after every write, so a view can await
//! `changed()` and re-render from a fresh read.

use std::sync::Arc;

use bulkwatch_core::{summarize, ActionStore, ActionSummary, BulkAction, LogBuffer, LogLine};
use tokio::sync::{watch, RwLock, RwLockReadGuard};

// ---------------------------------------------------------------------------
// StoreHandle
// ---------------------------------------------------------------------------

/// Cloneable handle to the process-wide [`ActionStore`].
#[derive(Debug, Clone)]
pub struct StoreHandle {
    inner: Arc<RwLock<ActionStore>>,
    revision_tx: Arc<watch::Sender<u64>>,
}

impl Default for StoreHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreHandle {
    pub fn new() -> Self {
        let (revision_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(ActionStore::new())),
            revision_tx: Arc::new(revision_tx),
        }
    }

    /// Receive the store revision after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    /// Run `f` under the write lock and publish the new revision if it
    /// changed anything.
    pub async fn mutate<R>(&self, f: impl FnOnce(&mut ActionStore) -> R) -> R {
        let mut store = self.inner.write().await;
        let before = store.revision();
        let result = f(&mut store);
        let after = store.revision();
        if after != before {
            self.revision_tx.send_replace(after);
        }
        result
    }

    /// Take and release the write lock, waiting out any write in flight.
    pub async fn settle(&self) {
        drop(self.inner.write().await);
    }

    pub async fn replace_all(&self, actions: Vec<BulkAction>) {
        self.mutate(|store| store.replace_all(actions)).await;
    }

    pub async fn append(&self, action: BulkAction) {
        self.mutate(|store| store.append(action)).await;
    }

    pub async fn upsert(&self, action: BulkAction) -> bool {
        self.mutate(|store| store.upsert(action)).await
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, ActionStore> {
        self.inner.read().await
    }

    /// Owned copy of every action, in store order.
    pub async fn snapshot(&self) -> Vec<BulkAction> {
        self.inner.read().await.all().to_vec()
    }

    pub async fn find_by_external_id(&self, action_id: &str) -> Option<BulkAction> {
        self.inner
            .read()
            .await
            .find_by_external_id(action_id)
            .cloned()
    }

    pub async fn summary(&self) -> ActionSummary {
        summarize(self.inner.read().await.all())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

// ---------------------------------------------------------------------------
// LogHandle
// ---------------------------------------------------------------------------

/// Cloneable handle to one detail view's [`LogBuffer`].
///
/// Publishes the line count after every push.
#[derive(Debug, Clone)]
pub struct LogHandle {
    inner: Arc<RwLock<LogBuffer>>,
    len_tx: Arc<watch::Sender<usize>>,
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl LogHandle {
    pub fn new() -> Self {
        let (len_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(LogBuffer::new())),
            len_tx: Arc::new(len_tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.len_tx.subscribe()
    }

    /// Append `line` if `allow` still holds once the write lock is taken.
    pub async fn push_if(&self, allow: impl FnOnce() -> bool, line: LogLine) -> bool {
        let mut buffer = self.inner.write().await;
        if !allow() {
            return false;
        }
        buffer.push(line);
        self.len_tx.send_replace(buffer.len());
        true
    }

    /// Take and release the write lock, waiting out any push in flight.
    pub async fn settle(&self) {
        drop(self.inner.write().await);
    }

    pub async fn push(&self, line: LogLine) {
        self.push_if(|| true, line).await;
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, LogBuffer> {
        self.inner.read().await
    }

    pub async fn snapshot(&self) -> Vec<LogLine> {
        self.inner.read().await.lines().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

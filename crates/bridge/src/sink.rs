//! Translation of transport events into guarded store mutations.

use std::fmt;

use bulkwatch_client::PushEvent;
use bulkwatch_core::{ActionStore, BulkAction, LogLine};

use crate::handle::{LogHandle, StoreHandle};
use crate::slot::GenerationGuard;

/// Which view a bridge instance serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    List,
    Detail { action_id: String },
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("list"),
            Self::Detail { action_id } => write!(f, "detail:{action_id}"),
        }
    }
}

/// What an [`EventSink`] did with one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Appended,
    Replaced,
    /// An update for an id the store does not hold.
    Dropped,
    /// Not relevant to this view.
    Ignored,
    /// The issuing instance was deactivated or superseded.
    Stale,
}

/// Applies events on behalf of one bridge instance.
///
/// The generation check runs under the same write lock as the mutation,
/// so no write that starts after deactivation lands. A write already
/// past the check may still finish; [`EventSink::settle`] waits for it.
#[derive(Debug, Clone)]
pub struct EventSink {
    kind: ViewKind,
    store: StoreHandle,
    logs: Option<LogHandle>,
    guard: GenerationGuard,
}

impl EventSink {
    pub fn new(
        kind: ViewKind,
        store: StoreHandle,
        logs: Option<LogHandle>,
        guard: GenerationGuard,
    ) -> Self {
        Self {
            kind,
            store,
            logs,
            guard,
        }
    }

    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    pub fn generation(&self) -> u64 {
        self.guard.generation()
    }

    pub fn is_current(&self) -> bool {
        self.guard.is_current()
    }

    /// Apply a push event.
    ///
    /// The list view appends created actions and upserts updates. The
    /// detail view only upserts updates for its own action.
    pub async fn apply_push(&self, event: PushEvent) -> Applied {
        let applied = match (&self.kind, event) {
            (ViewKind::List, PushEvent::Created(action)) => {
                self.guarded(|store| {
                    store.append(action);
                    Applied::Appended
                })
                .await
            }
            (ViewKind::List, PushEvent::Updated(action)) => self.upsert(action).await,
            (ViewKind::Detail { action_id }, PushEvent::Updated(action))
                if action.action_id == *action_id =>
            {
                self.upsert(action).await
            }
            (ViewKind::Detail { .. }, _) => Applied::Ignored,
        };

        tracing::trace!(
            view = %self.kind,
            generation = self.generation(),
            ?applied,
            "Push event applied",
        );
        applied
    }

    /// Append a streamed log line to this view's buffer.
    pub async fn apply_log(&self, line: LogLine) -> Applied {
        let Some(logs) = &self.logs else {
            return Applied::Ignored;
        };
        if logs.push_if(|| self.guard.is_current(), line).await {
            Applied::Appended
        } else {
            Applied::Stale
        }
    }

    /// Install the initial list fetch.
    pub async fn apply_list(&self, actions: Vec<BulkAction>) -> Applied {
        self.guarded(|store| {
            store.replace_all(actions);
            Applied::Replaced
        })
        .await
    }

    /// Install the initial detail fetch: replace the stored record, or
    /// append it when the store does not hold it yet.
    pub async fn apply_detail(&self, action: BulkAction) -> Applied {
        self.guarded(|store| {
            if store.find_by_id(action.id).is_some() {
                store.upsert(action);
                Applied::Replaced
            } else {
                store.append(action);
                Applied::Appended
            }
        })
        .await
    }

    /// Wait until no write from this sink holds the store or log lock.
    pub async fn settle(&self) {
        self.store.settle().await;
        if let Some(logs) = &self.logs {
            logs.settle().await;
        }
    }

    // ---- private helpers ----

    async fn upsert(&self, action: BulkAction) -> Applied {
        let id = action.id;
        let applied = self
            .guarded(|store| {
                if store.upsert(action) {
                    Applied::Replaced
                } else {
                    Applied::Dropped
                }
            })
            .await;
        if applied == Applied::Dropped {
            tracing::debug!(id, view = %self.kind, "Update for unknown action dropped");
        }
        applied
    }

    async fn guarded(&self, f: impl FnOnce(&mut ActionStore) -> Applied) -> Applied {
        self.store
            .mutate(|store| {
                if self.guard.is_current() {
                    f(store)
                } else {
                    Applied::Stale
                }
            })
            .await
    }
}

//! Bridge lifecycle: activation, the feed task, and teardown.
//!
//! Activation claims a generation from the view's [`ViewSlot`], spawns
//! one task that opens the push subscription (and the log stream for a
//! detail view) and applies each event through an [`EventSink`] in
//! delivery order. The returned [`ActiveBridge`] cancels that task when
//! deactivated or dropped.

use std::sync::Arc;
use std::time::Duration;

use bulkwatch_client::events::CHANNEL_BULK_ACTION;
use bulkwatch_client::{
    ActionSource, FetchError, LogSource, LogStream, PushEvent, PushSource, PushStream,
    StreamError,
};
use bulkwatch_core::LogLine;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::handle::{LogHandle, StoreHandle};
use crate::sink::{EventSink, ViewKind};
use crate::slot::ViewSlot;
use crate::status::{FeedStatus, ViewState};

/// How long [`ActiveBridge::shutdown`] waits for the feed task to close
/// its sources before aborting it.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// The transports a bridge reads from.
///
/// `push` is `None` in fetch-only mode. `logs` is only used by the
/// detail view.
#[derive(Clone)]
pub struct Sources {
    pub actions: Arc<dyn ActionSource>,
    pub push: Option<Arc<dyn PushSource>>,
    pub logs: Option<Arc<dyn LogSource>>,
}

impl Sources {
    pub fn new(actions: Arc<dyn ActionSource>) -> Self {
        Self {
            actions,
            push: None,
            logs: None,
        }
    }

    pub fn with_push(mut self, push: Arc<dyn PushSource>) -> Self {
        self.push = Some(push);
        self
    }

    pub fn with_logs(mut self, logs: Arc<dyn LogSource>) -> Self {
        self.logs = Some(logs);
        self
    }
}

// ---------------------------------------------------------------------------
// View bridges
// ---------------------------------------------------------------------------

/// Bridge for the action list view.
pub struct ListBridge {
    store: StoreHandle,
    sources: Sources,
    slot: Arc<ViewSlot>,
}

impl ListBridge {
    pub fn new(store: StoreHandle, sources: Sources) -> Self {
        Self {
            store,
            sources,
            slot: ViewSlot::new(),
        }
    }

    /// Start a new list instance, superseding any previous one.
    pub fn activate(&self) -> ActiveBridge {
        ActiveBridge::start(ViewKind::List, &self.store, &self.sources, &self.slot, None)
    }
}

/// Bridge for the single-action detail view.
pub struct DetailBridge {
    store: StoreHandle,
    sources: Sources,
    slot: Arc<ViewSlot>,
}

impl DetailBridge {
    pub fn new(store: StoreHandle, sources: Sources) -> Self {
        Self {
            store,
            sources,
            slot: ViewSlot::new(),
        }
    }

    /// Start a detail instance for `action_id` with a fresh log buffer,
    /// superseding any previous one.
    pub fn activate(&self, action_id: impl Into<String>) -> ActiveBridge {
        let kind = ViewKind::Detail {
            action_id: action_id.into(),
        };
        ActiveBridge::start(
            kind,
            &self.store,
            &self.sources,
            &self.slot,
            Some(LogHandle::new()),
        )
    }
}

// ---------------------------------------------------------------------------
// ActiveBridge
// ---------------------------------------------------------------------------

/// One active bridge instance. Deactivates on drop.
pub struct ActiveBridge {
    sink: EventSink,
    actions: Arc<dyn ActionSource>,
    logs: Option<LogHandle>,
    status_rx: watch::Receiver<FeedStatus>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ActiveBridge {
    fn start(
        kind: ViewKind,
        store: &StoreHandle,
        sources: &Sources,
        slot: &Arc<ViewSlot>,
        logs: Option<LogHandle>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let guard = slot.claim(cancel.clone());
        let sink = EventSink::new(kind.clone(), store.clone(), logs.clone(), guard);

        let initial = if sources.push.is_some() {
            FeedStatus::Connecting
        } else {
            FeedStatus::Disabled
        };
        let (status_tx, status_rx) = watch::channel(initial);

        let log_source = match &kind {
            ViewKind::Detail { .. } => sources.logs.clone(),
            ViewKind::List => None,
        };
        let feeds = Feeds {
            push: sources.push.clone(),
            logs: log_source,
        };

        tracing::info!(view = %kind, generation = sink.generation(), "Bridge activated");

        let task = tokio::spawn(run_feeds(sink.clone(), feeds, status_tx, cancel.clone()));

        Self {
            sink,
            actions: Arc::clone(&sources.actions),
            logs,
            status_rx,
            cancel,
            task: Some(task),
        }
    }

    pub fn kind(&self) -> &ViewKind {
        self.sink.kind()
    }

    pub fn generation(&self) -> u64 {
        self.sink.generation()
    }

    /// A handle to this instance's sink. Writes through it become no-ops
    /// once the instance is deactivated or superseded.
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    /// Feed health updates.
    pub fn status(&self) -> watch::Receiver<FeedStatus> {
        self.status_rx.clone()
    }

    /// The detail view's log buffer. `None` for the list view.
    pub fn logs(&self) -> Option<&LogHandle> {
        self.logs.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.sink.is_current()
    }

    /// Run the view's initial REST load and apply it to the store.
    pub async fn load(&self) -> ViewState {
        match self.sink.kind() {
            ViewKind::List => match self.actions.list_actions().await {
                Ok(actions) => {
                    tracing::debug!(count = actions.len(), "Loaded bulk actions");
                    self.sink.apply_list(actions).await;
                    ViewState::Loaded
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load bulk actions");
                    ViewState::Error(e.to_string())
                }
            },
            ViewKind::Detail { action_id } => match self.actions.get_action(action_id).await {
                Ok(action) => {
                    self.sink.apply_detail(action).await;
                    ViewState::Loaded
                }
                Err(FetchError::NotFound(_)) => {
                    tracing::info!(action_id = %action_id, "Bulk action not found");
                    ViewState::NotFound
                }
                Err(e) => {
                    tracing::warn!(action_id = %action_id, error = %e, "Failed to load bulk action");
                    ViewState::Error(e.to_string())
                }
            },
        }
    }

    /// Stop applying events and signal the feed task to close its
    /// sources. Idempotent.
    pub fn deactivate(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        tracing::info!(
            view = %self.sink.kind(),
            generation = self.sink.generation(),
            "Bridge deactivated",
        );
    }

    /// Deactivate and wait for the feed task to finish closing its
    /// sources, aborting it if that takes too long. Once this returns no
    /// write from this instance is still in flight.
    pub async fn shutdown(mut self) {
        self.deactivate();
        self.sink.settle().await;
        let Some(task) = self.task.take() else {
            return;
        };
        let abort = task.abort_handle();
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await.is_err() {
            tracing::warn!(view = %self.sink.kind(), "Feed task did not stop in time; aborting");
            abort.abort();
        }
    }
}

impl Drop for ActiveBridge {
    fn drop(&mut self) {
        self.deactivate();
    }
}

// ---------------------------------------------------------------------------
// Feed task
// ---------------------------------------------------------------------------

struct Feeds {
    push: Option<Arc<dyn PushSource>>,
    logs: Option<Arc<dyn LogSource>>,
}

/// Open the configured feeds and apply their events until cancelled.
async fn run_feeds(
    sink: EventSink,
    feeds: Feeds,
    status_tx: watch::Sender<FeedStatus>,
    cancel: CancellationToken,
) {
    let view = sink.kind().to_string();
    let mut healthy = true;

    let mut push: Option<Box<dyn PushStream>> = None;
    if let Some(source) = &feeds.push {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            result = source.subscribe(CHANNEL_BULK_ACTION) => result,
        };
        match opened {
            Ok(stream) => push = Some(stream),
            Err(e) => {
                report_failure(&status_tx, &view, "push channel", &e);
                healthy = false;
            }
        }
    }

    let mut logs: Option<Box<dyn LogStream>> = None;
    if let (Some(source), ViewKind::Detail { action_id }) = (&feeds.logs, sink.kind()) {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                close_push(&mut push).await;
                return;
            }
            result = source.open(action_id) => result,
        };
        match opened {
            Ok(stream) => logs = Some(stream),
            Err(e) => {
                report_failure(&status_tx, &view, "log stream", &e);
                healthy = false;
            }
        }
    }

    if healthy && (push.is_some() || logs.is_some()) {
        status_tx.send_replace(FeedStatus::Live);
        tracing::info!(
            view = %view,
            push = push.is_some(),
            logs = logs.is_some(),
            "Live feeds open",
        );
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = next_push(&mut push) => match event {
                Ok(Some(event)) => {
                    sink.apply_push(event).await;
                }
                Ok(None) => {
                    tracing::info!(view = %view, "Push channel closed by server");
                    status_tx.send_replace(FeedStatus::Disconnected {
                        reason: "push channel closed by server".into(),
                    });
                    push = None;
                }
                Err(e) => {
                    report_failure(&status_tx, &view, "push channel", &e);
                    close_push(&mut push).await;
                }
            },
            line = next_log(&mut logs) => match line {
                Ok(Some(line)) => {
                    sink.apply_log(line).await;
                }
                Ok(None) => {
                    tracing::info!(view = %view, "Log stream ended");
                    logs = None;
                }
                Err(e) => {
                    report_failure(&status_tx, &view, "log stream", &e);
                    logs = None;
                }
            },
        }
    }

    close_push(&mut push).await;
    tracing::debug!(view = %view, "Feed task exited");
}

/// Next push event, or never if the push feed is closed.
async fn next_push(push: &mut Option<Box<dyn PushStream>>) -> Result<Option<PushEvent>, StreamError> {
    match push {
        Some(stream) => stream.next_event().await,
        None => std::future::pending().await,
    }
}

/// Next log line, or never if the log feed is closed.
async fn next_log(logs: &mut Option<Box<dyn LogStream>>) -> Result<Option<LogLine>, StreamError> {
    match logs {
        Some(stream) => stream.next_line().await,
        None => std::future::pending().await,
    }
}

async fn close_push(push: &mut Option<Box<dyn PushStream>>) {
    if let Some(mut stream) = push.take() {
        stream.close().await;
    }
}

fn report_failure(
    status_tx: &watch::Sender<FeedStatus>,
    view: &str,
    feed: &str,
    error: &StreamError,
) {
    tracing::warn!(view = %view, feed, error = %error, "Live feed failed");
    status_tx.send_replace(FeedStatus::Disconnected {
        reason: format!("{feed}: {error}"),
    });
}

//! In-memory transports for driving bridges in tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bulkwatch_client::{
    ActionSource, FetchError, LogSource, LogStream, PushEvent, PushSource, PushStream, StreamError,
};
use bulkwatch_core::{BulkAction, BulkActionStatus, LogLine, LogStatus};
use chrono::Utc;
use tokio::sync::{mpsc, watch, Notify};

use bulkwatch_bridge::{FeedStatus, LogHandle, StoreHandle};

pub fn action(id: i64, action_id: &str, status: BulkActionStatus, total: i64) -> BulkAction {
    BulkAction {
        id,
        action_id: action_id.to_string(),
        status,
        total_records: total,
        skipped_count: None,
        failed_count: None,
        success_count: None,
        is_scheduled: false,
        scheduled_time: None,
        created_at: Utc::now(),
        completed_at: None,
        action_type: "update".to_string(),
        entity: "contact".to_string(),
    }
}

pub fn log_line(identifier: &str, status: LogStatus) -> LogLine {
    LogLine {
        identifier: identifier.to_string(),
        status,
        created_at: Utc::now(),
    }
}

/// Await `fut`, failing the test after one second.
pub async fn within_a_second<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(1), fut)
        .await
        .expect("condition not reached within 1s")
}

pub async fn wait_for_len(store: &StoreHandle, len: usize) {
    within_a_second(async {
        while store.len().await != len {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

pub async fn wait_for_action_status(
    store: &StoreHandle,
    action_id: &str,
    status: BulkActionStatus,
) {
    within_a_second(async {
        while store.find_by_external_id(action_id).await.map(|a| a.status) != Some(status.clone()) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

pub async fn wait_for_logs(logs: &LogHandle, len: usize) {
    within_a_second(async {
        while logs.len().await != len {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

pub async fn wait_for_count(counter: &AtomicUsize, value: usize) {
    within_a_second(async {
        while counter.load(Ordering::SeqCst) != value {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
}

pub async fn wait_for_status(
    status: &mut watch::Receiver<FeedStatus>,
    wanted: impl Fn(&FeedStatus) -> bool,
) -> FeedStatus {
    within_a_second(status.wait_for(wanted))
        .await
        .expect("status sender dropped")
        .clone()
}

// ---------------------------------------------------------------------------
// ActionSource
// ---------------------------------------------------------------------------

/// How the fake backend answers.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Actions(Vec<BulkAction>),
    NotFound,
    ServerError,
}

pub struct FakeActions {
    response: FakeResponse,
}

impl FakeActions {
    pub fn new(response: FakeResponse) -> Arc<Self> {
        Arc::new(Self { response })
    }

    fn failure(&self, action_id: &str) -> FetchError {
        match &self.response {
            FakeResponse::NotFound => FetchError::NotFound(action_id.to_string()),
            _ => FetchError::Api {
                status: 500,
                body: "backend unavailable".to_string(),
            },
        }
    }
}

#[async_trait]
impl ActionSource for FakeActions {
    async fn list_actions(&self) -> Result<Vec<BulkAction>, FetchError> {
        match &self.response {
            FakeResponse::Actions(actions) => Ok(actions.clone()),
            _ => Err(self.failure("")),
        }
    }

    async fn get_action(&self, action_id: &str) -> Result<BulkAction, FetchError> {
        match &self.response {
            FakeResponse::Actions(actions) => actions
                .iter()
                .find(|a| a.action_id == action_id)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(action_id.to_string())),
            _ => Err(self.failure(action_id)),
        }
    }
}

// ---------------------------------------------------------------------------
// PushSource
// ---------------------------------------------------------------------------

/// A push service fed from an unbounded channel. Supports one
/// subscription.
pub struct FakePush {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Result<PushEvent, StreamError>>>>,
    gate: Option<Arc<Notify>>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl FakePush {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<Result<PushEvent, StreamError>>) {
        Self::build(None)
    }

    /// A push service whose `subscribe` blocks until `gate` is notified.
    pub fn gated(
        gate: Arc<Notify>,
    ) -> (Arc<Self>, mpsc::UnboundedSender<Result<PushEvent, StreamError>>) {
        Self::build(Some(gate))
    }

    fn build(
        gate: Option<Arc<Notify>>,
    ) -> (Arc<Self>, mpsc::UnboundedSender<Result<PushEvent, StreamError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fake = Arc::new(Self {
            rx: Mutex::new(Some(rx)),
            gate,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        });
        (fake, tx)
    }
}

#[async_trait]
impl PushSource for FakePush {
    async fn subscribe(&self, _channel: &str) -> Result<Box<dyn PushStream>, StreamError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| StreamError::Connection("already subscribed".into()))?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePushStream {
            rx,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct FakePushStream {
    rx: mpsc::UnboundedReceiver<Result<PushEvent, StreamError>>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl PushStream for FakePushStream {
    async fn next_event(&mut self) -> Result<Option<PushEvent>, StreamError> {
        match self.rx.recv().await {
            Some(Ok(event)) => Ok(Some(event)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// LogSource
// ---------------------------------------------------------------------------

/// A log service fed from an unbounded channel. Records which action
/// ids were opened and counts streams dropped.
pub struct FakeLogs {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Result<LogLine, StreamError>>>>,
    pub opened_for: Mutex<Vec<String>>,
    pub closed: Arc<AtomicUsize>,
}

impl FakeLogs {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<Result<LogLine, StreamError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fake = Arc::new(Self {
            rx: Mutex::new(Some(rx)),
            opened_for: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicUsize::new(0)),
        });
        (fake, tx)
    }
}

#[async_trait]
impl LogSource for FakeLogs {
    async fn open(&self, action_id: &str) -> Result<Box<dyn LogStream>, StreamError> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| StreamError::Connection("already open".into()))?;
        self.opened_for.lock().unwrap().push(action_id.to_string());
        Ok(Box::new(FakeLogStream {
            rx,
            closed: Arc::clone(&self.closed),
        }))
    }
}

struct FakeLogStream {
    rx: mpsc::UnboundedReceiver<Result<LogLine, StreamError>>,
    closed: Arc<AtomicUsize>,
}

impl Drop for FakeLogStream {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LogStream for FakeLogStream {
    async fn next_line(&mut self) -> Result<Option<LogLine>, StreamError> {
        match self.rx.recv().await {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}

//! Transport seams used by the live update bridge.
//!
//! The bridge only talks to these traits. The concrete clients in this
//! crate implement them; tests substitute in-memory sources.

use async_trait::async_trait;
use bulkwatch_core::{BulkAction, LogLine};

use crate::api::{BackendApi, FetchError};
use crate::error::StreamError;
use crate::events::PushEvent;
use crate::logs::{LogFeed, LogStreamClient};
use crate::push::{PushClient, PushConnection};

/// Initial REST load.
#[async_trait]
pub trait ActionSource: Send + Sync {
    async fn list_actions(&self) -> Result<Vec<BulkAction>, FetchError>;

    async fn get_action(&self, action_id: &str) -> Result<BulkAction, FetchError>;
}

/// Opens push channel subscriptions.
#[async_trait]
pub trait PushSource: Send + Sync {
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn PushStream>, StreamError>;
}

/// One open push subscription.
#[async_trait]
pub trait PushStream: Send {
    /// Next event, or `Ok(None)` when the server closed the subscription.
    async fn next_event(&mut self) -> Result<Option<PushEvent>, StreamError>;

    /// Unsubscribe and release the connection.
    async fn close(&mut self);
}

/// Opens per-action log streams.
#[async_trait]
pub trait LogSource: Send + Sync {
    async fn open(&self, action_id: &str) -> Result<Box<dyn LogStream>, StreamError>;
}

/// One open log stream.
#[async_trait]
pub trait LogStream: Send {
    /// Next line, or `Ok(None)` when the server ended the stream.
    async fn next_line(&mut self) -> Result<Option<LogLine>, StreamError>;
}

// ---------------------------------------------------------------------------
// Implementations for the network clients
// ---------------------------------------------------------------------------

#[async_trait]
impl ActionSource for BackendApi {
    async fn list_actions(&self) -> Result<Vec<BulkAction>, FetchError> {
        BackendApi::list_actions(self).await
    }

    async fn get_action(&self, action_id: &str) -> Result<BulkAction, FetchError> {
        BackendApi::get_action(self, action_id).await
    }
}

#[async_trait]
impl PushSource for PushClient {
    async fn subscribe(&self, channel: &str) -> Result<Box<dyn PushStream>, StreamError> {
        let mut connection = self.connect().await?;
        if let Err(e) = connection.subscribe(channel).await {
            connection.close().await;
            return Err(e);
        }
        Ok(Box::new(connection))
    }
}

#[async_trait]
impl PushStream for PushConnection {
    async fn next_event(&mut self) -> Result<Option<PushEvent>, StreamError> {
        PushConnection::next_event(self).await
    }

    async fn close(&mut self) {
        PushConnection::close(self).await;
    }
}

#[async_trait]
impl LogSource for LogStreamClient {
    async fn open(&self, action_id: &str) -> Result<Box<dyn LogStream>, StreamError> {
        let feed = LogStreamClient::open(self, action_id).await?;
        Ok(Box::new(feed))
    }
}

#[async_trait]
impl LogStream for LogFeed {
    async fn next_line(&mut self) -> Result<Option<LogLine>, StreamError> {
        LogFeed::next_line(self).await
    }
}

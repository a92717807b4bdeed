//! Streaming log feed for one bulk action.
//!
//! The backend pushes one Server-Sent Event per processed record on
//! `GET /logging/{actionId}/logs`; each event's data is a JSON
//! [`LogLine`]. [`LogStreamClient::open`] starts the request and
//! returns a [`LogFeed`] to pull lines from.

use std::collections::VecDeque;

use bulkwatch_core::LogLine;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};

use crate::api::endpoint_url;
use crate::error::StreamError;
use crate::sse::{SseDecoder, SseEvent};

const EVENT_STREAM: &str = "text/event-stream";

/// HTTP client for the log streaming endpoint.
#[derive(Clone)]
pub struct LogStreamClient {
    client: reqwest::Client,
    base_url: String,
}

/// An open log stream. Dropping it closes the HTTP connection.
pub struct LogFeed {
    action_id: String,
    chunks: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    decoder: SseDecoder,
    pending: VecDeque<SseEvent>,
}

impl LogStreamClient {
    /// The client must not carry a request timeout: the stream stays
    /// open for as long as the detail view is shown.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Open the log stream for `action_id`.
    pub async fn open(&self, action_id: &str) -> Result<LogFeed, StreamError> {
        let url = endpoint_url(&self.base_url, &["logging", action_id, "logs"])
            .ok_or_else(|| StreamError::Connection(format!("Invalid backend URL '{}'", self.base_url)))?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| StreamError::Connection(format!("Failed to open log stream: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Connection(format!(
                "Log stream rejected with status {status}"
            )));
        }

        tracing::info!(action_id, "Log stream opened");

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();

        Ok(LogFeed {
            action_id: action_id.to_string(),
            chunks,
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
        })
    }
}

impl LogFeed {
    pub fn action_id(&self) -> &str {
        &self.action_id
    }

    /// Pull the next log line.
    ///
    /// Events whose data is not a valid [`LogLine`] are logged and
    /// skipped. Returns `Ok(None)` when the server ends the stream.
    pub async fn next_line(&mut self) -> Result<Option<LogLine>, StreamError> {
        loop {
            while let Some(event) = self.pending.pop_front() {
                match LogLine::parse(&event.data) {
                    Ok(line) => return Ok(Some(line)),
                    Err(e) => {
                        tracing::warn!(
                            action_id = %self.action_id,
                            error = %e,
                            raw_message = %event.data,
                            "Failed to parse log line",
                        );
                    }
                }
            }

            match self.chunks.next().await {
                Some(Ok(bytes)) => self.pending.extend(self.decoder.feed(&bytes)),
                Some(Err(e)) => {
                    return Err(StreamError::Transport(format!("Log stream failed: {e}")));
                }
                None => {
                    tracing::info!(action_id = %self.action_id, "Log stream ended");
                    return Ok(None);
                }
            }
        }
    }
}

//! Per-record outcome lines streamed while an action is being processed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::{Filterable, StatusKey};
use crate::types::Timestamp;

pub const LOG_STATUS_QUEUED: &str = "queued";
pub const LOG_STATUS_SKIPPED: &str = "skipped";
pub const LOG_STATUS_FAILED: &str = "failed";

/// All recognised log line status strings, in tab order.
pub const VALID_LOG_STATUSES: &[&str] = &[LOG_STATUS_QUEUED, LOG_STATUS_SKIPPED, LOG_STATUS_FAILED];

/// Outcome of one record within a bulk action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogStatus {
    Queued,
    Skipped,
    Failed,
    Other(String),
}

impl StatusKey for LogStatus {
    const KEYS: &'static [&'static str] = VALID_LOG_STATUSES;

    fn from_key(key: &str) -> Option<Self> {
        match key {
            LOG_STATUS_QUEUED => Some(Self::Queued),
            LOG_STATUS_SKIPPED => Some(Self::Skipped),
            LOG_STATUS_FAILED => Some(Self::Failed),
            _ => None,
        }
    }

    fn as_key(&self) -> &str {
        match self {
            Self::Queued => LOG_STATUS_QUEUED,
            Self::Skipped => LOG_STATUS_SKIPPED,
            Self::Failed => LOG_STATUS_FAILED,
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for LogStatus {
    fn from(raw: String) -> Self {
        Self::from_key(&raw).unwrap_or(Self::Other(raw))
    }
}

impl From<LogStatus> for String {
    fn from(status: LogStatus) -> Self {
        match status {
            LogStatus::Other(raw) => raw,
            known => known.as_key().to_string(),
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_key())
    }
}

/// One streamed log entry. Field names are snake_case on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// External key of the record this line reports on.
    pub identifier: String,
    pub status: LogStatus,
    pub created_at: Timestamp,
}

impl LogLine {
    /// Parse one JSON-encoded log line from a stream payload.
    pub fn parse(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl Filterable for LogLine {
    type Status = LogStatus;

    fn status(&self) -> &LogStatus {
        &self.status
    }

    fn search_text(&self) -> &str {
        &self.identifier
    }
}

//! Bulk action records as served by the backend.
//!
//! A bulk action is one batch operation applied to many entity records,
//! tracked as a unit with aggregate counters. The backend serializes
//! them with camelCase field names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::{Filterable, StatusKey};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_SCHEDULED: &str = "scheduled";

/// All recognised bulk action status strings, in tab order.
pub const VALID_ACTION_STATUSES: &[&str] = &[
    STATUS_COMPLETED,
    STATUS_IN_PROGRESS,
    STATUS_PENDING,
    STATUS_SCHEDULED,
];

/// Processing status of a bulk action.
///
/// Unrecognised strings are preserved in [`Other`](Self::Other) instead
/// of failing deserialization, so a newer backend cannot break the
/// client. Such records count toward totals but never match a tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BulkActionStatus {
    Completed,
    InProgress,
    Pending,
    Scheduled,
    Other(String),
}

impl BulkActionStatus {
    /// Whether this is one of the four statuses the dashboard knows.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl StatusKey for BulkActionStatus {
    const KEYS: &'static [&'static str] = VALID_ACTION_STATUSES;

    fn from_key(key: &str) -> Option<Self> {
        match key {
            STATUS_COMPLETED => Some(Self::Completed),
            STATUS_IN_PROGRESS => Some(Self::InProgress),
            STATUS_PENDING => Some(Self::Pending),
            STATUS_SCHEDULED => Some(Self::Scheduled),
            _ => None,
        }
    }

    fn as_key(&self) -> &str {
        match self {
            Self::Completed => STATUS_COMPLETED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Pending => STATUS_PENDING,
            Self::Scheduled => STATUS_SCHEDULED,
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for BulkActionStatus {
    fn from(raw: String) -> Self {
        Self::from_key(&raw).unwrap_or(Self::Other(raw))
    }
}

impl From<BulkActionStatus> for String {
    fn from(status: BulkActionStatus) -> Self {
        match status {
            BulkActionStatus::Other(raw) => raw,
            known => known.as_key().to_string(),
        }
    }
}

impl fmt::Display for BulkActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_key())
    }
}

// ---------------------------------------------------------------------------
// BulkAction
// ---------------------------------------------------------------------------

/// One batch operation mirrored from the backend.
///
/// `id` is the internal key used for in-place updates; `action_id` is
/// the public identifier used in URLs and search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAction {
    pub id: DbId,
    pub action_id: String,
    pub status: BulkActionStatus,
    pub total_records: i64,
    #[serde(default)]
    pub skipped_count: Option<i64>,
    #[serde(default)]
    pub failed_count: Option<i64>,
    #[serde(default)]
    pub success_count: Option<i64>,
    #[serde(default)]
    pub is_scheduled: bool,
    /// Only meaningful when `is_scheduled` is true.
    #[serde(default)]
    pub scheduled_time: Option<Timestamp>,
    pub created_at: Timestamp,
    /// Set once the action reaches a terminal state.
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    pub action_type: String,
    pub entity: String,
}

impl Filterable for BulkAction {
    type Status = BulkActionStatus;

    fn status(&self) -> &BulkActionStatus {
        &self.status
    }

    fn search_text(&self) -> &str {
        &self.action_id
    }
}

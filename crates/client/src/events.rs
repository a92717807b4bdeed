//! Bulk action events delivered over the push channel.
//!
//! The backend broadcasts two events on one public channel to every
//! subscriber; deciding which ones are relevant is up to the consumer.

use bulkwatch_core::BulkAction;
use serde::Deserialize;

use crate::messages::ChannelEvent;

/// The fixed channel the backend publishes bulk action events on.
pub const CHANNEL_BULK_ACTION: &str = "bulk-action";

/// A new bulk action was created.
pub const EVENT_NEW_BULK_ACTION: &str = "new-bulk-action";

/// An existing bulk action changed (status, counters, completion).
pub const EVENT_BULK_ACTION_UPDATED: &str = "bulk-action-updated";

/// A typed push event carrying one full bulk action record.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Created(BulkAction),
    Updated(BulkAction),
}

/// Both events wrap the record as `{"bulkAction": {...}}`.
#[derive(Debug, Deserialize)]
struct BulkActionPayload {
    #[serde(rename = "bulkAction")]
    bulk_action: BulkAction,
}

impl PushEvent {
    /// Interpret a channel event.
    ///
    /// Returns `Ok(None)` for events this client does not handle and
    /// `Err` when a known event carries a malformed payload.
    pub fn from_channel_event(event: &ChannelEvent) -> Result<Option<Self>, serde_json::Error> {
        let wrap: fn(BulkAction) -> Self = match event.event.as_str() {
            EVENT_NEW_BULK_ACTION => Self::Created,
            EVENT_BULK_ACTION_UPDATED => Self::Updated,
            _ => return Ok(None),
        };
        let payload = BulkActionPayload::deserialize(&event.data)?;
        Ok(Some(wrap(payload.bulk_action)))
    }

    /// The record carried by the event.
    pub fn action(&self) -> &BulkAction {
        match self {
            Self::Created(action) | Self::Updated(action) => action,
        }
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created(_) => EVENT_NEW_BULK_ACTION,
            Self::Updated(_) => EVENT_BULK_ACTION_UPDATED,
        }
    }
}

//! Aggregate counts shown in the summary panel.

use serde::Serialize;

use crate::bulk_action::{BulkAction, BulkActionStatus};

/// Per-status counts across a set of actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub scheduled: usize,
}

impl ActionSummary {
    /// Sum of the four named buckets. Smaller than `total` when some
    /// actions carry an unrecognised status.
    pub fn named_total(&self) -> usize {
        self.completed + self.in_progress + self.pending + self.scheduled
    }
}

/// Count actions by status.
///
/// Always recomputed from the full list; there are no incremental
/// counters to drift after appends, upserts, or replacements.
pub fn summarize(actions: &[BulkAction]) -> ActionSummary {
    actions.iter().fold(
        ActionSummary {
            total: actions.len(),
            ..Default::default()
        },
        |mut summary, action| {
            match action.status {
                BulkActionStatus::Completed => summary.completed += 1,
                BulkActionStatus::InProgress => summary.in_progress += 1,
                BulkActionStatus::Pending => summary.pending += 1,
                BulkActionStatus::Scheduled => summary.scheduled += 1,
                BulkActionStatus::Other(_) => {}
            }
            summary
        },
    )
}

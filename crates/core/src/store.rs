//! In-memory mirror of the backend's bulk actions.
//!
//! [`ActionStore`] is the single source of truth for action data on the
//! client. It is populated by the initial fetch and kept current by push
//! events; readers only ever see whole-record snapshots.

use crate::bulk_action::BulkAction;
use crate::types::DbId;

/// Ordered collection of bulk actions keyed by [`BulkAction::id`].
///
/// Every mutation bumps [`revision`](Self::revision) so observers can
/// tell whether anything changed since their last read.
#[derive(Debug, Default, Clone)]
pub struct ActionStore {
    actions: Vec<BulkAction>,
    revision: u64,
}

impl ActionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current contents and install `actions` verbatim.
    pub fn replace_all(&mut self, actions: Vec<BulkAction>) {
        self.actions = actions;
        self.bump();
    }

    /// Add `action` to the end, even if its `id` is already present.
    ///
    /// Mirrors a "new action created" notification, which the backend
    /// sends exactly once per action.
    pub fn append(&mut self, action: BulkAction) {
        self.actions.push(action);
        self.bump();
    }

    /// Replace the record with the same `id` in place.
    ///
    /// If no such record exists this is a no-op: updates for actions the
    /// client has not seen yet are dropped rather than inserted. Returns
    /// `true` when a record was replaced.
    pub fn upsert(&mut self, action: BulkAction) -> bool {
        match self.actions.iter_mut().find(|a| a.id == action.id) {
            Some(slot) => {
                *slot = action;
                self.bump();
                true
            }
            None => false,
        }
    }

    /// All actions in insertion order.
    pub fn all(&self) -> &[BulkAction] {
        &self.actions
    }

    /// Look up an action by its public identifier.
    pub fn find_by_external_id(&self, action_id: &str) -> Option<&BulkAction> {
        self.actions.iter().find(|a| a.action_id == action_id)
    }

    pub fn find_by_id(&self, id: DbId) -> Option<&BulkAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Monotonic mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::bulk_action::BulkActionStatus;

    fn action(id: DbId, action_id: &str, status: BulkActionStatus, total: i64) -> BulkAction {
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

    #[test]
    fn replace_all_discards_prior_contents() {
        let mut store = ActionStore::new();
        store.append(action(9, "old", BulkActionStatus::Pending, 1));

        store.replace_all(vec![
            action(1, "A1", BulkActionStatus::Pending, 10),
            action(2, "A2", BulkActionStatus::Completed, 5),
        ]);

        assert_eq!(store.len(), 2);
        assert!(store.find_by_id(9).is_none());
        assert_eq!(store.all()[0].action_id, "A1");
    }

    #[test]
    fn append_always_grows_even_for_duplicate_id() {
        let mut store = ActionStore::new();
        let a = action(1, "A1", BulkActionStatus::Pending, 10);

        store.append(a.clone());
        assert_eq!(store.len(), 1);
        store.append(a);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = ActionStore::new();
        store.replace_all(vec![
            action(1, "A1", BulkActionStatus::Pending, 10),
            action(2, "A2", BulkActionStatus::Pending, 20),
            action(3, "A3", BulkActionStatus::Pending, 30),
        ]);

        let mut updated = action(2, "A2", BulkActionStatus::Completed, 20);
        updated.success_count = Some(20);
        assert!(store.upsert(updated.clone()));

        assert_eq!(store.len(), 3);
        assert_eq!(store.all()[1], updated);
        assert_eq!(store.all()[0].id, 1);
        assert_eq!(store.all()[2].id, 3);
    }

    #[test]
    fn upsert_is_idempotent() {
        let mut store = ActionStore::new();
        store.replace_all(vec![action(1, "A1", BulkActionStatus::Pending, 10)]);
        let update = action(1, "A1", BulkActionStatus::InProgress, 10);

        store.upsert(update.clone());
        let once = store.all().to_vec();
        store.upsert(update);

        assert_eq!(store.all(), once.as_slice());
    }

    #[test]
    fn upsert_does_not_create() {
        let mut store = ActionStore::new();
        store.replace_all(vec![action(1, "A1", BulkActionStatus::Pending, 10)]);
        let before = store.all().to_vec();
        let revision = store.revision();

        assert!(!store.upsert(action(2, "A2", BulkActionStatus::Pending, 5)));

        assert_eq!(store.all(), before.as_slice());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn find_by_external_id() {
        let mut store = ActionStore::new();
        store.replace_all(vec![
            action(1, "A1", BulkActionStatus::Pending, 10),
            action(2, "A2", BulkActionStatus::Pending, 20),
        ]);
        assert_eq!(store.find_by_external_id("A2").map(|a| a.id), Some(2));
        assert!(store.find_by_external_id("a2").is_none());
    }

    #[test]
    fn every_mutation_bumps_revision() {
        let mut store = ActionStore::new();
        assert_eq!(store.revision(), 0);
        store.replace_all(vec![]);
        store.append(action(1, "A1", BulkActionStatus::Pending, 10));
        store.upsert(action(1, "A1", BulkActionStatus::Completed, 10));
        assert_eq!(store.revision(), 3);
    }
}

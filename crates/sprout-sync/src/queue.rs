//! The offline mutation queue
//!
//! An ordered, durable log of pending write operations. Repositories
//! append; only the sync coordinator removes entries, and only after
//! the remote has confirmed the corresponding request (or permanently
//! rejected it). The full list is persisted through the durable store
//! after every mutation, so the queue survives a process restart.
//!
//! The queue deliberately does no deduplication: two full-object
//! updates to the same entity replay in order, which is equivalent to
//! replaying only the last one, so duplicate suppression would be an
//! optimization rather than a correctness requirement.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use sprout_core::stamp_id;
use sprout_store::{DurableStore, StoreKey};

/// The domain operation a queued action replays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    UpdateProfile,
    UpdateProgress,
    SubmitActivityResult,
    AddKindnessMoment,
    AddStorybookEntry,
}

impl ActionKind {
    /// Stable string form, used as the id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::UpdateProfile => "updateProfile",
            ActionKind::UpdateProgress => "updateProgress",
            ActionKind::SubmitActivityResult => "submitActivityResult",
            ActionKind::AddKindnessMoment => "addKindnessMoment",
            ActionKind::AddStorybookEntry => "addStorybookEntry",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending write operation awaiting replay against the remote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedAction {
    /// Unique, monotonic-ish id
    pub id: String,
    /// The domain operation to replay
    pub action: ActionKind,
    /// The full payload, serialized at enqueue time
    pub data: Value,
    /// Epoch milliseconds at enqueue time
    pub timestamp: i64,
    /// Id of an action that must be applied remotely before this one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
}

/// The ordered, durable log of pending actions
///
/// Exclusively owns its entries: repositories append through
/// [`enqueue`](OfflineQueue::enqueue), the coordinator removes through
/// [`remove`](OfflineQueue::remove). Nothing else mutates the log.
pub struct OfflineQueue {
    store: DurableStore,
    actions: Vec<QueuedAction>,
}

impl OfflineQueue {
    /// Reload the queue from the durable store.
    ///
    /// A missing or unreadable stored queue starts empty; pending
    /// actions written by a previous session are picked up as-is.
    pub async fn load(store: DurableStore) -> Self {
        let actions: Vec<QueuedAction> = store
            .get(StoreKey::OfflineQueue)
            .await
            .unwrap_or_default();
        if !actions.is_empty() {
            debug!(pending = actions.len(), "Reloaded offline queue");
        }
        Self { store, actions }
    }

    /// Append an action to the log and persist it.
    ///
    /// Fire-and-forget from the caller's perspective: the action is
    /// durable the moment this returns, regardless of network state.
    /// Returns the new action's id.
    pub async fn enqueue(&mut self, action: ActionKind, data: Value) -> String {
        self.enqueue_after(action, data, None).await
    }

    /// Append an action that must not be replayed before `depends_on`
    /// has been applied remotely.
    pub async fn enqueue_after(
        &mut self,
        action: ActionKind,
        data: Value,
        depends_on: Option<String>,
    ) -> String {
        let id = stamp_id(action.as_str());
        self.actions.push(QueuedAction {
            id: id.clone(),
            action,
            data,
            timestamp: Utc::now().timestamp_millis(),
            depends_on,
        });
        self.persist().await;
        debug!(%id, %action, pending = self.actions.len(), "Queued action");
        id
    }

    /// Snapshot the current entries in insertion order.
    pub fn snapshot(&self) -> Vec<QueuedAction> {
        self.actions.clone()
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the queue holds no pending actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether the given action id is still pending.
    pub fn contains(&self, id: &str) -> bool {
        self.actions.iter().any(|a| a.id == id)
    }

    /// Remove the given ids and persist the remainder.
    ///
    /// Coordinator-only: ids are collected from a drain pass, either
    /// acknowledged by the remote or moved to the dead-letter record.
    /// Entries not named keep their original order.
    pub(crate) async fn remove(&mut self, ids: &HashSet<String>) {
        if ids.is_empty() {
            return;
        }
        self.actions.retain(|a| !ids.contains(&a.id));
        self.persist().await;
        debug!(removed = ids.len(), pending = self.actions.len(), "Pruned queue");
    }

    /// Drop all entries without replaying them. Used only by a full
    /// local-data clear.
    pub(crate) fn reset(&mut self) {
        self.actions.clear();
    }

    async fn persist(&self) {
        if !self.store.set(StoreKey::OfflineQueue, &self.actions).await {
            // The in-memory log still holds the entries; a later
            // persist retries the whole list.
            warn!("Failed to persist offline queue");
        }
    }
}

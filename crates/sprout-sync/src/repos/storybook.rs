//! Storybook repository

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use sprout_core::{NewStorybookEntry, StorybookEntry};
use sprout_store::{DurableStore, StoreKey};

use crate::queue::{ActionKind, OfflineQueue};

/// Append-only façade for storybook entries
#[derive(Clone)]
pub struct StorybookRepository {
    store: DurableStore,
    queue: Arc<Mutex<OfflineQueue>>,
}

impl StorybookRepository {
    pub(crate) fn new(store: DurableStore, queue: Arc<Mutex<OfflineQueue>>) -> Self {
        Self { store, queue }
    }

    /// Stamp, append and queue a new storybook entry.
    pub async fn add(&self, new: NewStorybookEntry) -> Option<StorybookEntry> {
        let entry = new.into_entry();

        let mut entries = self
            .store
            .get::<Vec<StorybookEntry>>(StoreKey::Storybook)
            .await
            .unwrap_or_default();
        entries.push(entry.clone());
        self.store.set(StoreKey::Storybook, &entries).await;

        let data = match serde_json::to_value(&entry) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to serialize storybook entry for queueing");
                return None;
            }
        };
        self.queue
            .lock()
            .await
            .enqueue(ActionKind::AddStorybookEntry, data)
            .await;

        Some(entry)
    }

    /// All storybook entries, in creation order.
    pub async fn entries(&self) -> Vec<StorybookEntry> {
        self.store
            .get(StoreKey::Storybook)
            .await
            .unwrap_or_default()
    }
}

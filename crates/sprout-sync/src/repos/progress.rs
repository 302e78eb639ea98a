//! Progress repository

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use sprout_core::{ProgressUpdate, UserProgress};
use sprout_store::{DurableStore, StoreKey};

use crate::queue::{ActionKind, OfflineQueue};

/// Read-through/write-through façade for the progress aggregate
///
/// Progress is mutated by whole-object replace-and-persist; there is
/// no field-level merge, so concurrent partial updates must be
/// composed by the caller before writing.
#[derive(Clone)]
pub struct ProgressRepository {
    store: DurableStore,
    queue: Arc<Mutex<OfflineQueue>>,
}

impl ProgressRepository {
    pub(crate) fn new(store: DurableStore, queue: Arc<Mutex<OfflineQueue>>) -> Self {
        Self { store, queue }
    }

    /// The current progress aggregate.
    ///
    /// A brand-new user gets the seeded initial progress, persisted on
    /// first read so subsequent reads are stable.
    pub async fn get(&self) -> UserProgress {
        if let Some(progress) = self.store.get::<UserProgress>(StoreKey::Progress).await {
            return progress;
        }

        let initial = UserProgress::initial();
        self.store.set(StoreKey::Progress, &initial).await;
        initial
    }

    /// Merge a partial update into the aggregate, persist the new full
    /// object and queue the replication.
    pub async fn update(&self, update: ProgressUpdate) -> bool {
        let updated = self.get().await.apply(update);
        self.store.set(StoreKey::Progress, &updated).await;

        let data = match serde_json::to_value(&updated) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to serialize progress for queueing");
                return false;
            }
        };
        self.queue
            .lock()
            .await
            .enqueue(ActionKind::UpdateProgress, data)
            .await;
        true
    }

    /// Bump the kindness counter locally without queueing a progress
    /// replication.
    ///
    /// The points ride the append-only kindness action that triggered
    /// the bump; replaying that action carries them to the remote, so
    /// queueing a whole-object progress update here would double-count
    /// on retry.
    pub(crate) async fn record_kindness_points(&self, delta: u32) {
        let mut progress = self.get().await;
        progress.kindness_points += delta;
        self.store.set(StoreKey::Progress, &progress).await;
    }
}

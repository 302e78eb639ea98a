//! Kindness moments repository

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use sprout_core::{KindnessMoment, NewKindnessMoment};
use sprout_store::{DurableStore, StoreKey};

use crate::queue::{ActionKind, OfflineQueue};
use crate::repos::ProgressRepository;

/// Append-only façade for kindness moments
#[derive(Clone)]
pub struct KindnessRepository {
    store: DurableStore,
    queue: Arc<Mutex<OfflineQueue>>,
    progress: ProgressRepository,
}

impl KindnessRepository {
    pub(crate) fn new(
        store: DurableStore,
        queue: Arc<Mutex<OfflineQueue>>,
        progress: ProgressRepository,
    ) -> Self {
        Self {
            store,
            queue,
            progress,
        }
    }

    /// Stamp, append and queue a new kindness moment.
    ///
    /// The moment's points are added to the local progress aggregate
    /// in the same call. Returns the stamped moment.
    pub async fn add(&self, new: NewKindnessMoment) -> Option<KindnessMoment> {
        let moment = new.into_moment();

        let mut moments = self
            .store
            .get::<Vec<KindnessMoment>>(StoreKey::KindnessMoments)
            .await
            .unwrap_or_default();
        moments.push(moment.clone());
        self.store.set(StoreKey::KindnessMoments, &moments).await;

        self.progress.record_kindness_points(moment.points).await;

        let data = match serde_json::to_value(&moment) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to serialize kindness moment for queueing");
                return None;
            }
        };
        self.queue
            .lock()
            .await
            .enqueue(ActionKind::AddKindnessMoment, data)
            .await;

        Some(moment)
    }

    /// All recorded kindness moments, in creation order.
    pub async fn moments(&self) -> Vec<KindnessMoment> {
        self.store
            .get(StoreKey::KindnessMoments)
            .await
            .unwrap_or_default()
    }
}

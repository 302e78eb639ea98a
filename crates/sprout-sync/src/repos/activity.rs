//! Activities repository

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use sprout_core::{Activity, ActivityResult};
use sprout_gateway::RemoteGateway;
use sprout_store::{DurableStore, StoreKey};

use crate::queue::{ActionKind, OfflineQueue};

/// Façade for the activity catalog and completion results
///
/// The catalog lives on the remote; completion results are recorded
/// locally and replicated through the queue like every other write.
#[derive(Clone)]
pub struct ActivityRepository {
    store: DurableStore,
    gateway: Arc<dyn RemoteGateway>,
    queue: Arc<Mutex<OfflineQueue>>,
}

impl ActivityRepository {
    pub(crate) fn new(
        store: DurableStore,
        gateway: Arc<dyn RemoteGateway>,
        queue: Arc<Mutex<OfflineQueue>>,
    ) -> Self {
        Self {
            store,
            gateway,
            queue,
        }
    }

    /// Fetch the activity catalog. Empty when the remote is
    /// unreachable.
    pub async fn catalog(&self) -> Vec<Activity> {
        match self.gateway.get_activities(&[]).await {
            Ok(response) => response.data.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to fetch activity catalog");
                Vec::new()
            }
        }
    }

    /// Record a completed activity locally and queue its submission.
    pub async fn complete(&self, result: ActivityResult) -> bool {
        let mut results = self
            .store
            .get::<Vec<ActivityResult>>(StoreKey::ActivityResults)
            .await
            .unwrap_or_default();
        results.push(result.clone());
        self.store.set(StoreKey::ActivityResults, &results).await;

        let data = match serde_json::to_value(&result) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to serialize activity result for queueing");
                return false;
            }
        };
        self.queue
            .lock()
            .await
            .enqueue(ActionKind::SubmitActivityResult, data)
            .await;
        true
    }

    /// Locally recorded completion results, in completion order.
    pub async fn results(&self) -> Vec<ActivityResult> {
        self.store
            .get(StoreKey::ActivityResults)
            .await
            .unwrap_or_default()
    }
}

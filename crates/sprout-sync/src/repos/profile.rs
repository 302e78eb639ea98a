//! Profile repository

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use sprout_core::{Profile, ProfileUpdate};
use sprout_gateway::RemoteGateway;
use sprout_store::{DurableStore, StoreKey};

use crate::queue::{ActionKind, OfflineQueue};

/// Read-through/write-through façade for the user profile
///
/// The profile is the only collection that hydrates from the remote on
/// a local miss; everything else defaults locally.
#[derive(Clone)]
pub struct ProfileRepository {
    store: DurableStore,
    gateway: Arc<dyn RemoteGateway>,
    queue: Arc<Mutex<OfflineQueue>>,
    user_id: String,
}

impl ProfileRepository {
    pub(crate) fn new(
        store: DurableStore,
        gateway: Arc<dyn RemoteGateway>,
        queue: Arc<Mutex<OfflineQueue>>,
        user_id: String,
    ) -> Self {
        Self {
            store,
            gateway,
            queue,
            user_id,
        }
    }

    /// The current profile: local state first, one remote fetch on a
    /// miss.
    ///
    /// A profile fetched from the remote is persisted for next time;
    /// if storage is degraded it is still returned, just not cached.
    pub async fn get(&self) -> Option<Profile> {
        if let Some(profile) = self.store.get::<Profile>(StoreKey::Profile).await {
            return Some(profile);
        }

        match self.gateway.get_profile(&self.user_id).await {
            Ok(response) => {
                let profile = response.data?;
                if !self.store.set(StoreKey::Profile, &profile).await {
                    debug!("Fetched profile not cached (storage degraded)");
                }
                Some(profile)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch profile from remote");
                None
            }
        }
    }

    /// Merge a partial update into the current profile, persist it and
    /// queue the replication.
    ///
    /// Returns `false` only when there is no current profile to update.
    pub async fn update(&self, update: ProfileUpdate) -> bool {
        let Some(current) = self.get().await else {
            warn!("No profile available to update");
            return false;
        };

        let updated = current.apply(update);
        self.store.set(StoreKey::Profile, &updated).await;

        let data = match serde_json::to_value(&updated) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to serialize profile for queueing");
                return false;
            }
        };
        self.queue
            .lock()
            .await
            .enqueue(ActionKind::UpdateProfile, data)
            .await;
        true
    }
}
